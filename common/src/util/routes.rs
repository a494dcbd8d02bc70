pub fn convert_route() -> &'static str {
    "/api/convert"
}

pub fn upload_route(file_name: &str) -> String {
    format!("/uploads/{}", file_name)
}

/// Joins a configured base such as `http://localhost:5000/` with a route.
pub fn absolute_url(base_url: &str, route: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), route)
}
