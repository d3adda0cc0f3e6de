//! Primitive wire codec for the mgmt protocol.
//!
//! Every multi-byte integer on the wire is little-endian. Hardware
//! addresses and device classes are stored in reverse octet order
//! relative to display order. Fixed-width strings are zero-terminated,
//! and variable-length responses carry a `u16` element count.
//!
//! All reads validate the span length up front and fail with
//! [`MgmtError::PayloadFormat`] instead of relying on slice bounds.

use smol_str::SmolStr;

use crate::error::{MgmtError, Result};

/// Reads a little-endian `u16` at `off`.
pub fn read_u16(pay: &[u8], off: usize, what: &'static str) -> Result<u16> {
   let Some(span) = pay.get(off..off + 2) else {
      return Err(MgmtError::payload(what, pay.len()));
   };
   Ok(u16::from_le_bytes([span[0], span[1]]))
}

/// Reads a little-endian `u32` at `off`.
pub fn read_u32(pay: &[u8], off: usize, what: &'static str) -> Result<u32> {
   let Some(span) = pay.get(off..off + 4) else {
      return Err(MgmtError::payload(what, pay.len()));
   };
   Ok(u32::from_le_bytes([span[0], span[1], span[2], span[3]]))
}

/// Fails unless the payload is exactly `len` bytes long.
pub fn expect_len(pay: &[u8], len: usize, what: &'static str) -> Result<()> {
   if pay.len() == len {
      Ok(())
   } else {
      Err(MgmtError::payload(what, pay.len()))
   }
}

/// Copies an exact-length span in reverse octet order.
///
/// Addresses (6 bytes) and device classes (3 bytes) arrive on the wire
/// reversed relative to their conventional display order.
pub fn reversed<const N: usize>(pay: &[u8], what: &'static str) -> Result<[u8; N]> {
   expect_len(pay, N, what)?;
   let mut out = [0u8; N];
   for (dst, src) in out.iter_mut().zip(pay.iter().rev()) {
      *dst = *src;
   }
   Ok(out)
}

/// Tests a single bit of a settings word.
pub const fn test_bit(word: u32, bit: u32) -> bool {
   word & (1 << bit) != 0
}

/// Logical value of a zero-terminated fixed-width span: the prefix up to
/// the first NUL, or the whole span if none is present.
pub fn zero_terminated(span: &[u8]) -> &[u8] {
   match span.iter().position(|&b| b == 0) {
      Some(end) => &span[..end],
      None => span,
   }
}

/// Decodes a zero-terminated span into a string, replacing invalid UTF-8.
pub fn zero_terminated_str(span: &[u8]) -> SmolStr {
   SmolStr::from(String::from_utf8_lossy(zero_terminated(span)))
}

/// Validates a count-prefixed block: a `u16` element count followed by
/// `count` elements of `elem_size` bytes each.
///
/// Returns the count and the element region. The region may be followed
/// by further data; callers that require an exact total length check it
/// themselves.
pub fn counted_block<'a>(
   pay: &'a [u8],
   elem_size: usize,
   what: &'static str,
) -> Result<(usize, &'a [u8])> {
   let count = read_u16(pay, 0, what)? as usize;
   let need = 2 + count * elem_size;
   if pay.len() < need {
      return Err(MgmtError::payload(what, pay.len()));
   }
   Ok((count, &pay[2..need]))
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_read_u16_le() {
      assert_eq!(read_u16(&[0x34, 0x12], 0, "x").unwrap(), 0x1234);
      assert_eq!(read_u16(&[0x00, 0x34, 0x12], 1, "x").unwrap(), 0x1234);
      assert!(read_u16(&[0x34], 0, "x").is_err());
   }

   #[test]
   fn test_read_u32_le() {
      assert_eq!(
         read_u32(&[0x78, 0x56, 0x34, 0x12], 0, "x").unwrap(),
         0x1234_5678
      );
      assert!(read_u32(&[0x78, 0x56, 0x34], 0, "x").is_err());
   }

   #[test]
   fn test_reversed_copy() {
      let out: [u8; 6] = reversed(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06], "addr").unwrap();
      assert_eq!(out, [0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);

      let err = reversed::<6>(&[0x01, 0x02], "addr").unwrap_err();
      assert!(matches!(
         err,
         MgmtError::PayloadFormat { actual: 2, .. }
      ));
   }

   #[test]
   fn test_zero_terminated_span() {
      assert_eq!(zero_terminated(b"Pwn\0\0\0\0\0\0\0\0"), b"Pwn");
      assert_eq!(zero_terminated(b"NoTerminator"), b"NoTerminator");
      assert_eq!(zero_terminated(b"\0rest"), b"");
      assert_eq!(zero_terminated_str(b"Pwn\0\0\0\0\0\0\0\0"), "Pwn");
   }

   #[test]
   fn test_counted_block_bounds() {
      // count=3, 2-byte elements, exact length
      let pay = [0x03, 0x00, 0x00, 0x00, 0x01, 0x00, 0x02, 0x00];
      let (count, body) = counted_block(&pay, 2, "list").unwrap();
      assert_eq!(count, 3);
      assert_eq!(body.len(), 6);

      // truncated element region must fail, not panic
      let short = [0x03, 0x00, 0x00, 0x00, 0x01, 0x00];
      assert!(counted_block(&short, 2, "list").is_err());

      // missing count prefix
      assert!(counted_block(&[0x03], 2, "list").is_err());
   }
}
