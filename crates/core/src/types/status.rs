//! Order status values.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Maps to the backend's Spanish wire values (`pendiente`, `pagado`,
/// ...). An order that stays `pendiente` past the backend's expiry
/// window is flagged expired by the backend; that flag travels
/// separately from the status itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "pagado")]
    Paid,
    #[serde(rename = "enviado")]
    Shipped,
    #[serde(rename = "entregado")]
    Delivered,
    #[serde(rename = "cancelado")]
    Canceled,
}

impl OrderStatus {
    /// The raw wire value, as the backend sends it.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pendiente",
            Self::Paid => "pagado",
            Self::Shipped => "enviado",
            Self::Delivered => "entregado",
            Self::Canceled => "cancelado",
        }
    }

    /// Capitalized display label.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Pending => "Pendiente",
            Self::Paid => "Pagado",
            Self::Shipped => "Enviado",
            Self::Delivered => "Entregado",
            Self::Canceled => "Cancelado",
        }
    }

    /// Whether the order is still waiting for payment.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendiente" => Ok(Self::Pending),
            "pagado" => Ok(Self::Paid),
            "enviado" => Ok(Self::Shipped),
            "entregado" => Ok(Self::Delivered),
            "cancelado" => Ok(Self::Canceled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values() {
        let status: OrderStatus = serde_json::from_str("\"pendiente\"").unwrap();
        assert_eq!(status, OrderStatus::Pending);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"pendiente\"");
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("refunded".parse::<OrderStatus>().is_err());
        assert_eq!(
            "enviado".parse::<OrderStatus>().unwrap(),
            OrderStatus::Shipped
        );
    }

    #[test]
    fn test_display_name() {
        assert_eq!(OrderStatus::Pending.display_name(), "Pendiente");
        assert_eq!(OrderStatus::Delivered.display_name(), "Entregado");
    }

    #[test]
    fn test_is_pending() {
        assert!(OrderStatus::Pending.is_pending());
        assert!(!OrderStatus::Paid.is_pending());
    }
}
