//! SQLite-vec extension loader.
//!
//! Holds the only unsafe code in the crate: registering sqlite-vec as an
//! auto-loaded extension so every subsequent connection can create and
//! query `vec0` virtual tables.

use rusqlite::ffi::{sqlite3, sqlite3_api_routines, sqlite3_auto_extension};
use sqlite_vec::sqlite3_vec_init;

type ExtensionEntrypoint =
    unsafe extern "C" fn(*mut sqlite3, *mut *mut i8, *const sqlite3_api_routines) -> i32;

/// Register the sqlite-vec extension for all future connections.
///
/// Call once at process startup, before the first `SQLite` record store is
/// opened. Idempotent with respect to correctness: re-registering the same
/// entrypoint is harmless.
///
/// # Safety
/// Uses FFI to register a `SQLite` auto-extension; the entrypoint comes
/// from the sqlite-vec crate and matches the signature `SQLite` expects.
#[allow(unsafe_code)]
pub fn init_sqlite_vec_extension() {
    // SAFETY: sqlite3_auto_extension is a stable SQLite API; sqlite3_vec_init
    // is the extension entrypoint exported by the sqlite-vec crate.
    unsafe {
        sqlite3_auto_extension(Some(std::mem::transmute::<*const (), ExtensionEntrypoint>(
            sqlite3_vec_init as *const (),
        )));
    }
}
