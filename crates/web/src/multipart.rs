//! Decoding of `multipart/form-data` request bodies.
//!
//! The boundary is not taken from the `Content-Type` header: the first line
//! of the body (everything before the first CRLF, leading `--` included) is
//! the delimiter. The body is then split byte-exactly on `delimiter + CRLF`:
//!
//! ```text
//! --boundary\r\n
//! Content-Disposition: form-data; name="count"\r\n
//! \r\n
//! 10\r\n
//! --boundary\r\n
//! Content-Disposition: form-data; name="file"; filename="c:\dir\text.text"\r\n
//! Content-Type: text/plain\r\n
//! \r\n
//! HELLO WORLD!\r\n
//! --boundary--\r\n
//! ```
//!
//! Parts carrying both `name` and `filename` become [`UploadedFile`]s, the
//! others become form fields. Decoding never fails as a whole: the first
//! malformed part stops it and everything decoded so far is kept.

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

use crate::params::ValueMap;

const CRLF: &[u8] = b"\r\n";
const HEADER_END: &[u8] = b"\r\n\r\n";
const CLOSE_MARKER: &[u8] = b"--";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// The form field the file was posted under.
    pub field_name: String,
    /// The client supplied file name, reduced to its last path segment.
    pub file_name: String,
    pub content_type: Option<String>,
    pub content: Bytes,
}

impl UploadedFile {
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    pub files: Vec<UploadedFile>,
    pub fields: ValueMap,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MultipartError {
    #[error("empty multipart delimiter")]
    EmptyDelimiter,

    #[error("part {index} has no header block")]
    MissingHeaderBlock { index: usize },

    #[error("part {index} has no name")]
    MissingName { index: usize },
}

impl MultipartError {
    fn missing_header_block(index: usize) -> Self {
        Self::MissingHeaderBlock { index }
    }

    fn missing_name(index: usize) -> Self {
        Self::MissingName { index }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MultipartDecoder;

impl MultipartDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decodes `body`, returning whatever could be decoded.
    ///
    /// File contents are slices of `body`, not copies.
    pub fn decode(&self, body: &Bytes) -> ParseResult {
        let mut result = ParseResult::default();
        if let Err(e) = self.decode_into(body, &mut result) {
            debug!(error = %e, files = result.files.len(), fields = result.fields.len(), "stop decoding multipart body");
        }
        result
    }

    /// Decodes `body` into `result`, stopping at the first malformed part.
    pub fn decode_into(&self, body: &Bytes, result: &mut ParseResult) -> Result<(), MultipartError> {
        let Some(line_end) = find(body, CRLF) else {
            return Ok(());
        };

        let delimiter = &body[..line_end];
        if delimiter.is_empty() {
            return Err(MultipartError::EmptyDelimiter);
        }

        let separator = [delimiter, CRLF].concat();
        let closing = [CRLF, delimiter, CLOSE_MARKER].concat();

        let chunks = split(body, &separator);
        let last = chunks.len().saturating_sub(1);

        for (index, chunk) in chunks.into_iter().enumerate() {
            let chunk = if index == last { strip_closing(chunk, &closing) } else { strip_suffix(chunk, CRLF) };

            if chunk.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            Self::decode_part(body, index, chunk, result)?;
        }

        Ok(())
    }

    fn decode_part(body: &Bytes, index: usize, part: &[u8], result: &mut ParseResult) -> Result<(), MultipartError> {
        let header_end = find(part, HEADER_END).ok_or_else(|| MultipartError::missing_header_block(index))?;
        let header = String::from_utf8_lossy(&part[..header_end]);
        let content = &part[header_end + HEADER_END.len()..];

        let headers = PartHeaders::parse(&header);
        let name = headers.name.ok_or_else(|| MultipartError::missing_name(index))?;

        match headers.file_name {
            Some(file_name) => result.files.push(UploadedFile {
                field_name: name,
                file_name: base_name(&file_name).to_string(),
                content_type: headers.content_type,
                content: body.slice_ref(content),
            }),
            None => result.fields.append(name, String::from_utf8_lossy(content).trim()),
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
struct PartHeaders {
    name: Option<String>,
    file_name: Option<String>,
    content_type: Option<String>,
}

impl PartHeaders {
    fn parse(block: &str) -> Self {
        let mut headers = PartHeaders::default();

        for line in block.split("\r\n") {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };

            if key.trim().eq_ignore_ascii_case(http::header::CONTENT_DISPOSITION.as_str()) {
                for (param, param_value) in disposition_params(value) {
                    match param.to_ascii_lowercase().as_str() {
                        "name" => headers.name = Some(param_value),
                        "filename" => headers.file_name = Some(param_value),
                        _ => {}
                    }
                }
            } else if key.trim().eq_ignore_ascii_case(http::header::CONTENT_TYPE.as_str()) {
                headers.content_type = Some(value.trim().to_string());
            }
        }

        headers
    }
}

/// Splits `form-data; name="a"; filename="b;c.txt"` into its parameters.
///
/// A quoted value runs to the next `"`, so it may contain `;` and `=`.
/// Backslashes are kept as sent, since clients put Windows paths in `filename`.
fn disposition_params(value: &str) -> Vec<(&str, String)> {
    let mut params = Vec::new();
    let mut rest = value.split_once(';').map_or("", |(_, params)| params);

    loop {
        rest = rest.trim_start_matches([';', ' ', '\t']);
        if rest.is_empty() {
            break;
        }

        let key_end = rest.find(['=', ';']).unwrap_or(rest.len());
        let key = rest[..key_end].trim();
        let Some(raw) = rest[key_end..].strip_prefix('=') else {
            rest = &rest[key_end..];
            continue;
        };

        let raw = raw.trim_start();
        let (param_value, remaining) = match raw.strip_prefix('"') {
            Some(quoted) => match quoted.split_once('"') {
                Some((inner, after)) => (inner, after),
                None => (quoted, ""),
            },
            None => {
                let end = raw.find(';').unwrap_or(raw.len());
                (raw[..end].trim_end(), &raw[end..])
            }
        };

        params.push((key, param_value.to_string()));
        rest = remaining;
    }

    params
}

/// Reduces a client supplied path (`c:\dir\a.txt`, `/home/a.txt`) to its file name.
fn base_name(path: &str) -> &str {
    path.rsplit(['\\', '/']).next().unwrap_or(path)
}

fn strip_closing<'a>(chunk: &'a [u8], closing: &[u8]) -> &'a [u8] {
    let chunk = strip_suffix(chunk, CRLF);
    chunk.strip_suffix(closing).unwrap_or(chunk)
}

fn strip_suffix<'a>(chunk: &'a [u8], suffix: &[u8]) -> &'a [u8] {
    chunk.strip_suffix(suffix).unwrap_or(chunk)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

fn split<'a>(mut haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    let mut chunks = Vec::new();
    while let Some(pos) = find(haystack, needle) {
        chunks.push(&haystack[..pos]);
        haystack = &haystack[pos + needle.len()..];
    }
    chunks.push(haystack);
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(file_name: &str) -> Bytes {
        [
            "--AaB03x\r\n",
            "Content-Disposition: form-data; name=\"count\"\r\n",
            "\r\n",
            "10\r\n",
            "--AaB03x\r\n",
            &format!("Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n"),
            "Content-Type: text/plain\r\n",
            "\r\n",
            "HELLO WORLD!\r\n",
            "--AaB03x--\r\n",
        ]
        .concat()
        .into()
    }

    #[test]
    fn decode_windows_file_name() {
        let result = MultipartDecoder::new().decode(&body(r"c:\ssts\text.text"));

        assert_eq!(result.fields.get("count"), Some("10"));
        assert_eq!(result.files.len(), 1);

        let file = &result.files[0];
        assert_eq!(file.field_name, "file");
        assert_eq!(file.file_name, "text.text");
        assert_eq!(file.content_type.as_deref(), Some("text/plain"));
        assert_eq!(file.content, Bytes::from_static(b"HELLO WORLD!"));
    }

    #[test]
    fn decode_unix_file_name() {
        let result = MultipartDecoder::new().decode(&body("/root/user/text.text"));

        assert_eq!(result.fields.get("count"), Some("10"));
        assert_eq!(result.files[0].file_name, "text.text");
        assert_eq!(result.files[0].content, Bytes::from_static(b"HELLO WORLD!"));
    }

    #[test]
    fn decode_keeps_binary_content() {
        let mut body = b"--b\r\nContent-Disposition: form-data; name=\"f\"; filename=\"x.bin\"\r\n\r\n".to_vec();
        body.extend_from_slice(&[0, 159, 146, 150, b'\r', b'\n', 255]);
        body.extend_from_slice(b"\r\n--b--\r\n");

        let result = MultipartDecoder::new().decode(&Bytes::from(body));

        assert_eq!(result.files[0].content.as_ref(), &[0, 159, 146, 150, b'\r', b'\n', 255]);
        assert_eq!(result.files[0].content_type, None);
    }

    #[test]
    fn decode_file_before_field() {
        let body = concat!(
            "--b\r\n",
            "Content-Disposition: form-data; name=\"upload\"; filename=\"a.txt\"\r\n",
            "\r\n",
            "first\r\n",
            "--b\r\n",
            "Content-Disposition: form-data; name=\"tag\"\r\n",
            "\r\n",
            "  spaced  \r\n",
            "--b--",
        );

        let result = MultipartDecoder::new().decode(&Bytes::from_static(body.as_bytes()));

        assert_eq!(result.files[0].content, Bytes::from_static(b"first"));
        assert_eq!(result.fields.get("tag"), Some("spaced"));
    }

    #[test]
    fn repeated_field_names_are_kept() {
        let body = concat!(
            "--b\r\n",
            "Content-Disposition: form-data; name=\"tag\"\r\n\r\na\r\n",
            "--b\r\n",
            "Content-Disposition: form-data; name=\"tag\"\r\n\r\nb\r\n",
            "--b--\r\n",
        );

        let result = MultipartDecoder::new().decode(&Bytes::from_static(body.as_bytes()));

        assert_eq!(result.fields.get_all("tag").collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn quoted_file_name_may_contain_separators() {
        let body = concat!(
            "--b\r\n",
            "Content-Disposition: form-data; filename=\"report;v2=final.txt\"; name=\"upload\"\r\n",
            "\r\n",
            "data\r\n",
            "--b--\r\n",
        );

        let result = MultipartDecoder::new().decode(&Bytes::from_static(body.as_bytes()));

        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].field_name, "upload");
        assert_eq!(result.files[0].file_name, "report;v2=final.txt");
    }

    #[test]
    fn disposition_params_accept_unquoted_values() {
        let params = disposition_params("form-data;name=count ; filename=a.txt;flag");

        assert_eq!(params, vec![("name", "count".to_string()), ("filename", "a.txt".to_string())]);
    }

    #[test]
    fn file_content_shares_the_body_buffer() {
        let body = body("a.txt");
        let range = body.as_ptr_range();

        let result = MultipartDecoder::new().decode(&body);

        let content = result.files[0].content.as_ptr_range();
        assert!(range.start <= content.start && content.end <= range.end);
    }

    #[test]
    fn body_without_line_break_is_empty() {
        let result = MultipartDecoder::new().decode(&Bytes::from_static(b"--boundary"));

        assert_eq!(result, ParseResult::default());
    }

    #[test]
    fn malformed_part_keeps_earlier_parts() {
        let body = concat!(
            "--b\r\n",
            "Content-Disposition: form-data; name=\"count\"\r\n\r\n10\r\n",
            "--b\r\n",
            "Content-Disposition: form-data\r\n\r\nnameless\r\n",
            "--b\r\n",
            "Content-Disposition: form-data; name=\"after\"\r\n\r\nlost\r\n",
            "--b--\r\n",
        );

        let mut result = ParseResult::default();
        let error = MultipartDecoder::new().decode_into(&Bytes::from_static(body.as_bytes()), &mut result);

        assert_eq!(error, Err(MultipartError::missing_name(2)));
        assert_eq!(result.fields.get("count"), Some("10"));
        assert!(!result.fields.contains_key("after"));
    }

    #[test]
    fn missing_header_block_stops_decoding() {
        let body = "--b\r\nContent-Disposition: form-data; name=\"x\"\r\n--b--\r\n";

        let mut result = ParseResult::default();
        let error = MultipartDecoder::new().decode_into(&Bytes::from_static(body.as_bytes()), &mut result);

        assert_eq!(error, Err(MultipartError::missing_header_block(1)));
    }
}
