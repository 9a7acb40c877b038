//! 客户端 IP 提取
//!
//! - 可信代理配置（server.trusted_proxies，支持 CIDR）
//! - 未配置时，连接来自私有地址则认为前面有反向代理

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use tracing::debug;

/// 检查 IP 是否为私有地址或 localhost
pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || (v6.segments()[0] & 0xfe00) == 0xfc00 // fc00::/7
                || (v6.segments()[0] & 0xffc0) == 0xfe80 // fe80::/10
        }
    }
}

/// 解析 "ip" 或 "ip:port"
fn parse_peer(peer: &str) -> Option<IpAddr> {
    peer.parse::<SocketAddr>()
        .map(|s| s.ip())
        .or_else(|_| peer.parse::<IpAddr>())
        .ok()
}

/// CIDR 检查
pub fn ip_in_cidr(ip: &IpAddr, cidr: &str) -> bool {
    let Some((network, prefix_len)) = cidr.split_once('/') else {
        return false;
    };
    let (Ok(prefix_len), Ok(network)) = (prefix_len.parse::<u32>(), network.parse::<IpAddr>())
    else {
        return false;
    };

    match (ip, network) {
        (IpAddr::V4(ip), IpAddr::V4(net)) if prefix_len <= 32 => {
            let mask = u32::MAX.checked_shl(32 - prefix_len).unwrap_or(0);
            (u32::from(*ip) & mask) == (u32::from(net) & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) if prefix_len <= 128 => {
            let mask = u128::MAX.checked_shl(128 - prefix_len).unwrap_or(0);
            (u128::from(*ip) & mask) == (u128::from(net) & mask)
        }
        _ => false,
    }
}

/// 检查 IP 是否在可信代理列表中
pub fn is_trusted_proxy(peer: &str, trusted_proxies: &[String]) -> bool {
    let Some(ip) = parse_peer(peer) else {
        return false;
    };
    trusted_proxies.iter().any(|proxy| {
        if proxy.contains('/') {
            ip_in_cidr(&ip, proxy)
        } else {
            proxy.parse::<IpAddr>().is_ok_and(|p| p == ip)
        }
    })
}

/// 从请求头提取转发的 IP（X-Forwarded-For 第一个，其次 X-Real-IP）
pub fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.trim().to_string())
        })
}

/// 根据对端地址和可信代理配置决定真实客户端 IP
///
/// 1. 显式配置了 trusted_proxies：只有匹配的对端才使用转发头
/// 2. 未配置：对端是私有地址时使用转发头（自动检测反向代理）
/// 3. 默认使用对端地址，防止伪造
pub fn resolve_client_ip(
    peer: Option<&str>,
    headers: &HeaderMap,
    trusted_proxies: &[String],
) -> Option<String> {
    let Some(peer) = peer else {
        return forwarded_ip(headers);
    };
    let peer_ip = parse_peer(peer).map(|ip| ip.to_string());

    if !trusted_proxies.is_empty() {
        if is_trusted_proxy(peer, trusted_proxies) {
            let real = forwarded_ip(headers).or(peer_ip);
            debug!("Trusted proxy {} -> {:?}", peer, real);
            return real;
        }
        return peer_ip;
    }

    if let Some(ip) = parse_peer(peer)
        && is_private_or_local(&ip)
        && let Some(real) = forwarded_ip(headers)
    {
        debug!("Auto-detected proxy at {}: using forwarded {}", peer, real);
        return Some(real);
    }

    peer_ip
}

/// 从 HttpRequest 提取真实客户端 IP
pub fn extract_client_ip(req: &HttpRequest, trusted_proxies: &[String]) -> Option<String> {
    let peer = req.peer_addr().map(|addr| addr.to_string());
    resolve_client_ip(peer.as_deref(), req.headers(), trusted_proxies)
}
