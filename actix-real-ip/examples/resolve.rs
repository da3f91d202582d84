//! Demonstrates resolving client addresses behind reverse proxies.
//!
//! Try:
//! ```sh
//! curl localhost:8080/client-ip -H 'X-Forwarded-For: 10.0.0.1, 203.0.113.7:4711'
//! curl localhost:8080/raw-header -H 'X-Forwarded-For: 10.0.0.1, 203.0.113.7:4711'
//! ```

use actix_real_ip::{ClientIp, RealIpExt as _, ResolveRealIp, Resolver, XForwardedFor};
use actix_web::{App, HttpRequest, HttpServer, Responder, get, web::Header};

#[get("/raw-header")]
async fn header(fwd: Option<Header<XForwardedFor>>, req: HttpRequest) -> impl Responder {
    let resolved = req
        .real_ip()
        .map_or_else(|| "none".to_owned(), |ip| ip.to_string());

    match fwd {
        Some(Header(fwd)) => format!("Possibly fake forwarding chain: {fwd}\nResolved: {resolved}"),
        None => format!("No forwarding chain\nResolved: {resolved}"),
    }
}

#[get("/client-ip")]
async fn client_ip(client_ip: ClientIp) -> impl Responder {
    format!("Client address: {client_ip} (from {})", client_ip.source())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // treat carrier-grade NAT as internal too
    let resolver = Resolver::default().private_range(
        "100.64.0.0/10"
            .parse()
            .expect("CGNAT range literal is valid"),
    );

    HttpServer::new(move || {
        App::new()
            .wrap(ResolveRealIp::new(resolver.clone()))
            .service(header)
            .service(client_ip)
    })
    .bind(("127.0.0.1", 8080))?
    .workers(2)
    .run()
    .await
}
