pub mod reqwest_downloader;
