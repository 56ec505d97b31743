use actix_web::{
    Error, HttpResponse,
    body::{BoxBody, MessageBody},
    dev::{ServiceRequest, ServiceResponse},
    http::{
        Method,
        header::{self, HeaderValue},
    },
    middleware::Next,
    web,
};

#[derive(Debug, Clone, Default)]
pub struct AllowedOrigins(Vec<String>);

impl AllowedOrigins {
    pub fn new(origins: Vec<String>) -> Self {
        Self(
            origins
                .into_iter()
                .map(|o| o.trim_end_matches('/').to_string())
                .collect(),
        )
    }

    pub fn allows(&self, origin: &str) -> bool {
        self.0.iter().any(|allowed| allowed == origin)
    }
}

/// Preflights never reach the router: every `OPTIONS` request gets a bare 204,
/// with the allow headers only when the origin is on the list.
pub async fn cors(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let origin = req.headers().get(header::ORIGIN).cloned();
    let allowed_origin = match (req.app_data::<web::Data<AllowedOrigins>>(), origin) {
        (Some(allowed), Some(origin))
            if origin.to_str().is_ok_and(|o| allowed.allows(o)) =>
        {
            Some(origin)
        }
        _ => None,
    };

    if req.method() == Method::OPTIONS {
        let mut response = HttpResponse::NoContent();
        if let Some(origin) = allowed_origin {
            response
                .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, origin))
                .insert_header((header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"))
                .insert_header((header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
                .insert_header((header::VARY, "Origin"));
        } else {
            tracing::debug!("Preflight from an origin that is not allowed");
        }
        return Ok(req.into_response(response.finish()));
    }

    let mut response = next.call(req).await?.map_into_boxed_body();
    if let Some(origin) = allowed_origin {
        let headers = response.headers_mut();
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        headers.append(header::VARY, HeaderValue::from_static("Origin"));
    }

    Ok(response)
}
