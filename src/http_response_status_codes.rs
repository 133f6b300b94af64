//! The HTTP response status codes this server sends.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpResponseStatusCode {
    OK200,
    Found302,
    SeeOther303,
    BadRequest400,
    Forbidden403,
    NotFound404,
    MethodNotAllowed405,
    InternalServerError500,
}

impl HttpResponseStatusCode {
    pub fn code(self) -> u16 {
        match self {
            Self::OK200 => 200,
            Self::Found302 => 302,
            Self::SeeOther303 => 303,
            Self::BadRequest400 => 400,
            Self::Forbidden403 => 403,
            Self::NotFound404 => 404,
            Self::MethodNotAllowed405 => 405,
            Self::InternalServerError500 => 500,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::OK200 => "OK",
            Self::Found302 => "Found",
            Self::SeeOther303 => "See Other",
            Self::BadRequest400 => "Bad Request",
            Self::Forbidden403 => "Forbidden",
            Self::NotFound404 => "Not Found",
            Self::MethodNotAllowed405 => "Method Not Allowed",
            Self::InternalServerError500 => "Internal Server Error",
        }
    }

    pub fn desc(self) -> &'static str {
        match self {
            Self::OK200 => "The request succeeded.",
            Self::Found302 | Self::SeeOther303 =>
                "The document is available at another location.",
            Self::BadRequest400 => "The request could not be understood.",
            Self::Forbidden403 => "You do not have access to this document.",
            Self::NotFound404 => "The requested document was not found on this server.",
            Self::MethodNotAllowed405 =>
                "The request method is not supported for this document.",
            Self::InternalServerError500 =>
                "The server encountered an error while handling the request.",
        }
    }

    pub fn is_redirect(self) -> bool {
        matches!(self, Self::Found302 | Self::SeeOther303)
    }
}
