pub mod http_download;
pub mod http_video_fetcher;
#[cfg(test)]
pub(crate) mod test_server;
