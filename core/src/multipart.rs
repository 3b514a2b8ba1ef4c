//! `multipart/form-data` encoding for single-file uploads.

use uuid::Uuid;

/// One file field of a form upload.
#[derive(Debug, Clone)]
pub struct FilePart<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub content: &'a [u8],
}

/// An encoded form body and the `content-type` header value announcing its
/// boundary.
#[derive(Debug, Clone)]
pub struct EncodedForm {
    pub content_type: String,
    pub body: Vec<u8>,
}

impl FilePart<'_> {
    /// Encode with a random boundary.
    pub fn encode(&self) -> EncodedForm {
        self.encode_with_boundary(&Uuid::new_v4().simple().to_string())
    }

    pub fn encode_with_boundary(&self, boundary: &str) -> EncodedForm {
        let mut body = Vec::with_capacity(self.content.len() + 256);
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                escape_quotes(self.field),
                escape_quotes(self.file_name)
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(self.content);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        EncodedForm {
            content_type: format!("multipart/form-data; boundary={boundary}"),
            body,
        }
    }
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_single_file_part() {
        let part = FilePart {
            field: "jarfile",
            file_name: "job.jar",
            content: b"PK\x03\x04",
        };
        let form = part.encode_with_boundary("b0undary");
        assert_eq!(form.content_type, "multipart/form-data; boundary=b0undary");

        let mut expected = Vec::new();
        expected.extend_from_slice(b"--b0undary\r\n");
        expected.extend_from_slice(
            b"Content-Disposition: form-data; name=\"jarfile\"; filename=\"job.jar\"\r\n",
        );
        expected.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        expected.extend_from_slice(b"PK\x03\x04");
        expected.extend_from_slice(b"\r\n--b0undary--\r\n");
        assert_eq!(form.body, expected);
    }

    #[test]
    fn quotes_in_file_name_are_escaped() {
        let part = FilePart {
            field: "jarfile",
            file_name: "we\"ird\\.jar",
            content: b"",
        };
        let body = String::from_utf8(part.encode_with_boundary("x").body).unwrap();
        assert!(body.contains(r#"filename="we\"ird\\.jar""#));
    }

    #[test]
    fn random_boundary_appears_in_header_and_body() {
        let part = FilePart {
            field: "jarfile",
            file_name: "a.jar",
            content: b"abc",
        };
        let form = part.encode();
        let boundary = form
            .content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap();
        assert_eq!(boundary.len(), 32);
        let body = String::from_utf8(form.body).unwrap();
        assert!(body.starts_with(&format!("--{boundary}\r\n")));
        assert!(body.ends_with(&format!("--{boundary}--\r\n")));
    }
}
