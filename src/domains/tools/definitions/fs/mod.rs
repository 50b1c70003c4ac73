pub mod copy_directory;
pub mod copy_file;
pub mod create_directory;
pub mod delete_file;
pub mod edit_file;
pub mod get_file_info;
pub mod list_allowed_paths;
pub mod list_directory;
pub mod move_file;
pub mod read_file;
pub mod search_files;
pub mod write_file;

pub use copy_directory::{CopyDirectoryParams, CopyDirectoryTool};
pub use copy_file::{CopyFileParams, CopyFileTool};
pub use create_directory::{CreateDirectoryParams, CreateDirectoryTool};
pub use delete_file::{DeleteFileParams, DeleteFileTool};
pub use edit_file::{EditFileParams, EditFileTool, EditParams};
pub use get_file_info::{GetFileInfoParams, GetFileInfoTool};
pub use list_allowed_paths::{ListAllowedPathsParams, ListAllowedPathsTool};
pub use list_directory::{KindFilter, ListDirectoryParams, ListDirectoryTool};
pub use move_file::{MoveFileParams, MoveFileTool};
pub use read_file::{ReadFileParams, ReadFileTool};
pub use search_files::{SearchFilesParams, SearchFilesTool};
pub use write_file::{WriteFileParams, WriteFileTool};
