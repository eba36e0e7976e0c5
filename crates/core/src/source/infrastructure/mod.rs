pub mod data_repo_source;
