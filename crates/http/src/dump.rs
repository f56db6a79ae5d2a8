//! Human readable dumps of wire messages for request logging.
//!
//! The output is line based and indented by two spaces per nesting level:
//!
//! ```text
//! GET /api/ping
//! Headers (1):
//!   [Accept] =
//!     [application/json]
//! Body: NULL
//! ```

use std::fmt::Write;

use crate::protocol::{HttpHeader, Request, Response};

const TAB_SIZE: usize = 2;

/// Renders a message as multi-line debug text.
pub trait Dump {
    fn dump(&self) -> String;
}

impl Dump for Request {
    fn dump(&self) -> String {
        let mut dumper = Dumper::new();
        dumper.line(format_args!("{} {}", self.method, self.url));
        dumper.headers(&self.headers);
        dumper.body(&self.body);
        dumper.finish()
    }
}

impl Dump for Response {
    fn dump(&self) -> String {
        let mut dumper = Dumper::new();
        dumper.line(format_args!("Status Code: {}", self.status_code));
        dumper.headers(&self.headers);
        dumper.body(&self.body);
        dumper.finish()
    }
}

struct Dumper {
    output: String,
    level: usize,
}

impl Dumper {
    fn new() -> Self {
        Self { output: String::new(), level: 0 }
    }

    fn line(&mut self, line: std::fmt::Arguments<'_>) {
        let indent = TAB_SIZE * self.level;
        // writing into a String can't fail
        let _ = writeln!(self.output, "{:indent$}{line}", "");
    }

    fn indented(&mut self, f: impl FnOnce(&mut Self)) {
        self.level += 1;
        f(self);
        self.level -= 1;
    }

    fn headers(&mut self, headers: &[HttpHeader]) {
        self.line(format_args!("Headers ({}):", headers.len()));
        self.indented(|dumper| {
            for header in headers {
                dumper.line(format_args!("[{}] =", header.key));
                dumper.indented(|dumper| dumper.line(format_args!("[{}]", header.value)));
            }
        });
    }

    fn body(&mut self, body: &[u8]) {
        if body.is_empty() {
            self.line(format_args!("Body: NULL"));
            return;
        }

        self.line(format_args!("Body (decoded UTF-8):"));
        self.line(format_args!("---BODY-START---"));
        self.line(format_args!(""));
        self.line(format_args!("{}", String::from_utf8_lossy(body)));
        self.line(format_args!(""));
        self.line(format_args!("---BODY-END---"));
    }

    fn finish(self) -> String {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn dump_request_without_body() {
        let request = Request::new("GET", "/api/ping").with_header("Accept", "application/json");

        let expected = indoc! {"
            GET /api/ping
            Headers (1):
              [Accept] =
                [application/json]
            Body: NULL
        "};
        assert_eq!(request.dump(), expected);
    }

    #[test]
    fn dump_response_with_body() {
        let response = Response::new(201).with_body("ok");

        let expected = indoc! {"
            Status Code: 201
            Headers (0):
            Body (decoded UTF-8):
            ---BODY-START---

            ok

            ---BODY-END---
        "};
        assert_eq!(response.dump(), expected);
    }
}
