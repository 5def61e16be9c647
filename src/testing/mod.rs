pub mod fixtures;
pub mod mock_ai;
pub mod mock_host;
pub mod mock_scm;
