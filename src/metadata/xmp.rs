/// Namespace prefix that opens every XMP packet stored in an `APP1` segment.
pub const XMP_IDENTIFIER: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";

/// Returns the XMP packet contained in an `APP1` payload, if it is one.
///
/// `payload` is the segment payload without the marker and length field (as returned by
/// [`Segment::payload`][crate::Segment::payload]). The packet is returned verbatim; decoding it as
/// text is up to the caller.
///
/// `APP1` is shared with Exif and other vendor data, so a payload without the XMP prefix is not
/// an error and yields `None`.
pub fn decode_xmp(payload: &[u8]) -> Option<&[u8]> {
    payload.strip_prefix(XMP_IDENTIFIER)
}

/// Builds a complete `APP1` segment (marker, length and payload) carrying `packet`.
///
/// Returns `None` if the packet does not fit into a single segment.
pub fn encode_xmp_segment(packet: &[u8]) -> Option<Vec<u8>> {
    let length = u16::try_from(2 + XMP_IDENTIFIER.len() + packet.len()).ok()?;

    let mut out = Vec::with_capacity(usize::from(length) + 2);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(XMP_IDENTIFIER);
    out.extend_from_slice(packet);
    Some(out)
}
