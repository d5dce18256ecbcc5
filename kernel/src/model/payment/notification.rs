use serde::Deserialize;
use shared::error::{AppError, AppResult};
use std::net::IpAddr;

// 決済ゲートウェイからの通知。照合に使う項目だけを読む
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayNotification {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    pub object: NotificationObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationObject {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub paid: Option<bool>,
}

impl GatewayNotification {
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpNetwork {
    addr: IpAddr,
    prefix: u8,
}

impl IpNetwork {
    pub fn contains(&self, ip: IpAddr) -> bool {
        match (self.addr, ip) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                let mask = u32::MAX.checked_shl(32 - u32::from(self.prefix)).unwrap_or(0);
                u32::from(net) & mask == u32::from(ip) & mask
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                let mask = u128::MAX.checked_shl(128 - u32::from(self.prefix)).unwrap_or(0);
                u128::from(net) & mask == u128::from(ip) & mask
            }
            // IPv4 射影アドレスで届いた場合
            (IpAddr::V4(_), IpAddr::V6(ip)) => ip
                .to_ipv4_mapped()
                .is_some_and(|v4| self.contains(IpAddr::V4(v4))),
            (IpAddr::V6(_), IpAddr::V4(_)) => false,
        }
    }
}

impl std::str::FromStr for IpNetwork {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::ConversionEntityError(format!("invalid network: {s}"));
        let (addr, prefix) = match s.split_once('/') {
            Some((addr, prefix)) => (
                addr.parse::<IpAddr>().map_err(|_| invalid())?,
                Some(prefix.parse::<u8>().map_err(|_| invalid())?),
            ),
            None => (s.parse::<IpAddr>().map_err(|_| invalid())?, None),
        };
        let max = if addr.is_ipv4() { 32 } else { 128 };
        let prefix = prefix.unwrap_or(max);
        if prefix > max {
            return Err(invalid());
        }
        Ok(Self { addr, prefix })
    }
}

// 通知の送信を許可するネットワーク
#[derive(Debug, Clone, Default)]
pub struct TrustedNetworks(Vec<IpNetwork>);

impl TrustedNetworks {
    pub fn parse<S: AsRef<str>>(networks: &[S]) -> AppResult<Self> {
        networks
            .iter()
            .map(|n| n.as_ref().trim().parse::<IpNetwork>())
            .collect::<AppResult<Vec<_>>>()
            .map(Self)
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        self.0.iter().any(|n| n.contains(ip))
    }
}
