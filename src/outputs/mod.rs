//! Output generation for a finished crawl.
//!
//! # Submodules
//!
//! - [`xlsx`]: Writes the collected rows to a spreadsheet
//! - [`archive`]: Bundles the crawler's output directory into a zip file
//!
//! # Output Structure
//!
//! ```text
//! output/
//! ├── AlJazeeraCrawler/
//! │   ├── news.xlsx
//! │   ├── custom.log
//! │   └── 1234567890.png
//! ├── output_AlJazeeraCrawler.zip
//! └── work_items_output.json
//! ```

pub mod archive;
pub mod xlsx;
