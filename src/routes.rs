use crate::{
    api::{employee, leave_request},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let requests_per_min = requests_per_min.max(1);
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(60_000 / requests_per_min as u64)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .expect("period and burst size are non-zero");
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth").service(
            web::resource("/login")
                .wrap(login_limiter)
                .route(web::post().to(handlers::login)),
        ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/leave")
                    // /leave
                    .service(web::resource("").route(web::post().to(leave_request::create_leave)))
                    .service(
                        web::resource("/preview").route(web::post().to(leave_request::preview_leave)),
                    )
                    .service(web::resource("/mine").route(web::get().to(leave_request::my_requests)))
                    .service(
                        web::resource("/balance").route(web::get().to(leave_request::my_balance)),
                    )
                    .service(
                        web::resource("/holidays").route(web::get().to(leave_request::holidays)),
                    )
                    // /leave/{id}
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave))),
            )
            .service(
                web::scope("/admin")
                    .service(
                        web::resource("/leave")
                            .route(web::get().to(leave_request::admin_leave_list)),
                    )
                    // /admin/leave/{id}/status
                    .service(
                        web::resource("/leave/{id}/status")
                            .route(web::put().to(leave_request::update_leave_status)),
                    )
                    .service(
                        web::resource("/panel").route(web::get().to(leave_request::admin_panel)),
                    )
                    // /admin/employee
                    .service(
                        web::resource("/employee")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /admin/employee/{id}
                    .service(
                        web::resource("/employee/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee)),
                    ),
            ),
    );
}
