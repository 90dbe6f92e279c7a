//! Record addressing
//!
//! A record address packs the owning file id into the high 32 bits and the
//! 1-based row number into the low 32 bits of one `u64`:
//!
//! ```text
//! address = (file_id << 32) | row_number
//! ```
//!
//! For a fixed file, address order is row order, so no separate sort key is
//! stored anywhere. Every query against a file starts from the file's
//! inclusive address range.

mod errors;
mod record_address;

pub use errors::{AddressError, AddressErrorCode, AddressResult};
pub use record_address::{AddressRange, FileId, RecordAddress, ROWS_PER_FILE};
