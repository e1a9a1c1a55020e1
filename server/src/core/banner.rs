//! Startup banner

use super::config::is_all_interfaces;
use super::constants::APP_NAME;

/// Print the startup banner with the API URLs
pub fn print_banner(host: &str, port: u16) {
    let display_host = if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    };
    const W: usize = 10;

    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m http://{}:{}/api/duckdb",
        "Query:", display_host, port
    );
    println!(
        "  \x1b[33m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m http://{}:{}/api/docs",
        "API docs:", display_host, port
    );

    if is_all_interfaces(host)
        && let Ok(interfaces) = local_ip_address::list_afinet_netifas()
    {
        for (_, ip) in interfaces
            .iter()
            .filter(|(_, ip)| ip.is_ipv4() && !ip.is_loopback())
        {
            println!(
                "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m http://{}:{}",
                "Network:", ip, port
            );
        }
    }

    println!();
}
