pub mod binlog_decoder;
pub mod bytes_binlog_reader;
pub mod file_binlog_reader;

pub mod event_decoder;
pub mod event_decoder_impl;
mod event_parser_dispatcher;
