pub mod http_sink;
