//! Decoder for the legacy serialized side-post metadata blob.
//!
//! The `docs_linkedSideposts` metadata value is written by the origin
//! system's native serializer. The grammar actually stored is narrow: a
//! top-level string-keyed array whose values are arrays whose first element
//! is the target post id, e.g.
//!
//! ```text
//! a:2:{s:8:"contatti";a:1:{i:0;s:4:"1234";}s:5:"dati";a:1:{i:0;i:77;}}
//! ```
//!
//! Only that subset is decoded. Anything outside it fails decoding, which
//! callers treat as "no boxes" — a soft condition, never an error.
//! String lengths are byte lengths, so the cursor walks raw bytes.

/// One decoded box reference, in blob order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxRef {
    /// Box label as stored (remapping of legacy labels happens later).
    pub title: String,

    /// Target post id (the first element of the value array).
    pub id: i64,
}

/// Decode the serialized side-post map into ordered box references.
///
/// Returns `None` when the blob does not match the expected grammar.
pub fn decode_linked_sideposts(raw: &str) -> Option<Vec<BoxRef>> {
    let mut cursor = Cursor::new(raw.as_bytes());
    let count = cursor.array_header()?;

    let mut refs = Vec::with_capacity(count);
    for _ in 0..count {
        let title = cursor.array_key()?;
        let id = cursor.value_array_first_id()?;
        refs.push(BoxRef { title, id });
    }
    cursor.expect(b"}")?;

    // Trailing garbage marks a malformed blob.
    if cursor.pos == cursor.input.len() {
        Some(refs)
    } else {
        None
    }
}

/// Byte cursor over the serialized input.
struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Consume the exact byte sequence or fail.
    fn expect(&mut self, token: &[u8]) -> Option<()> {
        let end = self.pos.checked_add(token.len())?;
        if self.input.get(self.pos..end)? == token {
            self.pos = end;
            Some(())
        } else {
            None
        }
    }

    /// Consume digits up to `stop`, returning them parsed.
    fn number_until(&mut self, stop: u8) -> Option<i64> {
        let start = self.pos;
        while let Some(&b) = self.input.get(self.pos) {
            if b == stop {
                let digits = std::str::from_utf8(&self.input[start..self.pos]).ok()?;
                self.pos += 1;
                return digits.parse().ok();
            }
            if !b.is_ascii_digit() && !(b == b'-' && self.pos == start) {
                return None;
            }
            self.pos += 1;
        }
        None
    }

    /// `a:N:{` — returns N.
    fn array_header(&mut self) -> Option<usize> {
        self.expect(b"a:")?;
        let count = self.number_until(b':')?;
        self.expect(b"{")?;
        usize::try_from(count).ok()
    }

    /// An array key: `s:len:"…";` or `i:n;`, as a string.
    fn array_key(&mut self) -> Option<String> {
        match self.input.get(self.pos)? {
            b's' => self.string(),
            b'i' => self.integer().map(|n| n.to_string()),
            _ => None,
        }
    }

    /// `s:LEN:"…";` — LEN counts bytes, not characters.
    fn string(&mut self) -> Option<String> {
        self.expect(b"s:")?;
        let len = usize::try_from(self.number_until(b':')?).ok()?;
        self.expect(b"\"")?;
        let end = self.pos.checked_add(len)?;
        let bytes = self.input.get(self.pos..end)?;
        let value = std::str::from_utf8(bytes).ok()?.to_string();
        self.pos = end;
        self.expect(b"\";")?;
        Some(value)
    }

    /// `i:N;`
    fn integer(&mut self) -> Option<i64> {
        self.expect(b"i:")?;
        self.number_until(b';')
    }

    /// A value array whose first element holds the target id, as `s:…` or
    /// `i:…`. Remaining elements are skipped.
    fn value_array_first_id(&mut self) -> Option<i64> {
        let count = self.array_header()?;
        if count == 0 {
            return None;
        }

        let mut first_id = None;
        for index in 0..count {
            // Element key (usually i:0, i:1, …); its value is irrelevant.
            self.array_key()?;
            let value = match self.input.get(self.pos)? {
                b's' => self.string()?.trim().parse().ok(),
                b'i' => Some(self.integer()?),
                _ => return None,
            };
            if index == 0 {
                first_id = value;
            }
        }
        self.expect(b"}")?;

        first_id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn decodes_string_and_integer_ids() {
        let raw = r#"a:2:{s:8:"contatti";a:1:{i:0;s:4:"1234";}s:4:"dati";a:2:{i:0;i:77;i:1;s:3:"xxx";}}"#;
        let refs = decode_linked_sideposts(raw).unwrap();

        assert_eq!(
            refs,
            vec![
                BoxRef {
                    title: "contatti".to_string(),
                    id: 1234
                },
                BoxRef {
                    title: "dati".to_string(),
                    id: 77
                },
            ]
        );
    }

    #[test]
    fn preserves_blob_order() {
        let raw = r#"a:3:{s:1:"c";a:1:{i:0;i:3;}s:1:"a";a:1:{i:0;i:1;}s:1:"b";a:1:{i:0;i:2;}}"#;
        let refs = decode_linked_sideposts(raw).unwrap();

        let titles: Vec<&str> = refs.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "a", "b"]);
    }

    #[test]
    fn empty_map_decodes_to_no_boxes() {
        assert_eq!(decode_linked_sideposts("a:0:{}"), Some(Vec::new()));
    }

    #[test]
    fn byte_lengths_cover_multibyte_labels() {
        // "più" is four bytes in UTF-8.
        let raw = r#"a:1:{s:4:"più";a:1:{i:0;i:5;}}"#;
        let refs = decode_linked_sideposts(raw).unwrap();
        assert_eq!(refs[0].title, "più");
        assert_eq!(refs[0].id, 5);
    }

    #[test]
    fn integer_keys_become_labels() {
        let raw = "a:1:{i:9;a:1:{i:0;i:41;}}";
        let refs = decode_linked_sideposts(raw).unwrap();
        assert_eq!(refs[0].title, "9");
        assert_eq!(refs[0].id, 41);
    }

    #[test]
    fn malformed_blobs_fail_softly() {
        for raw in [
            "",
            "garbage",
            "a:1:{s:1:\"x\";",                  // truncated
            "a:1:{s:9:\"x\";a:1:{i:0;i:1;}}",   // wrong length
            "a:1:{s:1:\"x\";i:5;}",             // value not an array
            "a:0:{}trailing",                   // trailing garbage
            "a:1:{s:1:\"x\";a:1:{i:0;b:1;}}",   // unsupported scalar
            "a:1:{s:1:\"x\";a:0:{}}",           // empty value array, no id
        ] {
            assert_eq!(decode_linked_sideposts(raw), None, "input: {raw:?}");
        }
    }

    #[test]
    fn non_numeric_string_id_fails() {
        let raw = r#"a:1:{s:1:"x";a:1:{i:0;s:3:"abc";}}"#;
        assert_eq!(decode_linked_sideposts(raw), None);
    }
}
