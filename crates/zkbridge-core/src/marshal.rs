//! Host-side copies of engine memory, plus small diagnostics helpers.
//!
//! Inputs never need marshaling beyond [`SliceDescriptor::from_slice`]: the
//! borrow of the host buffer *is* the pin, and it ends when the engine call
//! returns. Outputs are the opposite: the engine owns them, so they are copied
//! into a fresh host allocation before anything else happens.
//!
//! [`SliceDescriptor::from_slice`]: crate::SliceDescriptor::from_slice

use std::ffi::c_void;

use crate::slice::GoInt;

/// Number of leading bytes shown by [`preview`] in debug logs.
pub const PREVIEW_BYTES: usize = 8;

/// Copy an engine result region into a host-owned string.
///
/// Returns `None` when `ptr` is null or `len <= 0`. Otherwise exactly `len`
/// bytes are copied into a fresh buffer, and the string is built from that
/// copy; the source region is not touched again and may be released right
/// after this returns. Bytes that are not valid UTF-8 are replaced with
/// `U+FFFD`.
///
/// # Safety
/// If `ptr` is non-null and `len > 0`, `ptr` must be valid for reads of `len`
/// bytes for the duration of the call.
#[must_use]
pub unsafe fn decode_result(ptr: *const c_void, len: GoInt) -> Option<String> {
    if ptr.is_null() || len <= 0 {
        return None;
    }
    let len = usize::try_from(len).ok()?;

    // SAFETY: non-null and readable for `len` bytes per the caller's contract.
    let src = unsafe { std::slice::from_raw_parts(ptr.cast::<u8>(), len) };
    let copy = src.to_vec();

    Some(match String::from_utf8(copy) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Lowercase hex of the first [`PREVIEW_BYTES`] bytes, for trace logs only.
#[must_use]
pub fn preview(bytes: &[u8]) -> String {
    hex::encode(&bytes[..bytes.len().min(PREVIEW_BYTES)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn null_or_empty_regions_decode_to_none() {
        let data = b"proof";
        unsafe {
            assert_eq!(decode_result(ptr::null(), 5), None);
            assert_eq!(decode_result(data.as_ptr().cast(), 0), None);
            assert_eq!(decode_result(data.as_ptr().cast(), -1), None);
        }
    }

    #[test]
    fn copies_exactly_len_bytes() {
        let data = b"proof-and-trailing-garbage";
        let got = unsafe { decode_result(data.as_ptr().cast(), 5) };
        assert_eq!(got.as_deref(), Some("proof"));
    }

    #[test]
    fn copy_is_independent_of_source() {
        let mut data = b"{\"proof\":\"aa\"}".to_vec();
        let len = GoInt::try_from(data.len()).unwrap();
        let got = unsafe { decode_result(data.as_ptr().cast(), len) }.unwrap();
        data.fill(0);
        drop(data);
        assert_eq!(got, "{\"proof\":\"aa\"}");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let data = [b'o', b'k', 0xFF];
        let got = unsafe { decode_result(data.as_ptr().cast(), 3) }.unwrap();
        assert_eq!(got, "ok\u{FFFD}");
    }

    #[test]
    fn preview_is_bounded() {
        assert_eq!(preview(&[]), "");
        assert_eq!(preview(&[0xAB, 0x01]), "ab01");
        assert_eq!(preview(&[0u8; 64]), "0000000000000000");
    }
}
