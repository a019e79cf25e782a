pub const RECIPE_COUNT_PER_PAGE: i64 = 10;
pub const USER_COUNT_PER_PAGE: i64 = 10;
pub const SUBSCRIPTION_COUNT_PER_PAGE: i64 = 10;

pub const SESSION_COOKIE: &str = "session";

pub const SHOPLIST_FILENAME: &str = "shoplist.txt";

pub const MEDIA_URL: &str = "/media";
pub const RECIPE_IMAGE_DIR: &str = "recipes/images";
