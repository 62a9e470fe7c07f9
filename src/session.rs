//! Keys under which the signed-in identity lives in the cookie session.

pub const USER_ID: &str = "user_id";
pub const USER_EMAIL: &str = "user_email";
