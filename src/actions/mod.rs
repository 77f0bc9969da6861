//! File actions module.
//!
//! The only action is permanent deletion of confirmed duplicates, see
//! [`delete`].
//!
//! ```no_run
//! use dupfinder::actions::delete_all;
//! use std::path::PathBuf;
//!
//! let duplicates = vec![PathBuf::from("/path/to/copy.txt")];
//! let batch = delete_all(&duplicates).unwrap();
//! println!("{}", batch.summary());
//! ```

pub mod delete;

pub use delete::{delete_all, permanent_delete, BatchDeleteResult, DeleteError, DeleteResult};
