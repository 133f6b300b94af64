pub mod str_util;
pub mod io_util;
pub mod easy_fs;
pub mod language;
pub mod lang_en_de;
pub mod url_encoding;
pub mod random_util;
pub mod hash_util;
pub mod http_request_method;
pub mod http_response_status_codes;
pub mod webutils;
pub mod rouille_util;
pub mod security;
pub mod logging;

pub mod config;
pub mod error;
pub mod datamap;
pub mod dictionary;
pub mod template_store;
pub mod render;
pub mod response;
pub mod event;
pub mod session;
pub mod acontext;
pub mod controller;
pub mod pages;
pub mod router;
pub mod middleware;
pub mod layout;
pub mod dispatch;
pub mod rouille_runner;
