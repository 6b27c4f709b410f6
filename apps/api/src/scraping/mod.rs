pub mod apify;
