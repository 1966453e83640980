//! crates/laundry_core/src/guest.rs
//!
//! Builds the guest-detail panel shown from the reception room map.

use tracing::error;

use crate::domain::{GuestDetailsData, StayHistoryEntry};
use crate::ports::{GuestDetailsService, PortError};

const MISSING_ID_MESSAGE: &str = "ID do hóspede não encontrado. É um registro antigo?";
const NOT_FOUND_MESSAGE: &str = "Hóspede não encontrado";
const UNKNOWN_ERROR_MESSAGE: &str = "Erro desconhecido";

/// What the guest panel shows once loading finishes.
#[derive(Debug, Clone, PartialEq)]
pub enum GuestPanel {
    Content(GuestCard),
    /// Shown inline in the panel, never as an alert.
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GuestCard {
    pub name: String,
    pub ficha_number: String,
    pub document: String,
    pub birth_date: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub room: String,
    pub status: String,
    pub checkin: String,
    pub checkout: String,
    pub total_consumed: String,
    pub total_paid: String,
    pub balance: String,
    pub history: Vec<StayLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StayLine {
    pub checkin: String,
    pub room: String,
    pub total: String,
    pub status: String,
}

/// Loads the panel for `guest_id`, shown for `room`.
pub async fn load_guest_panel(
    service: &dyn GuestDetailsService,
    guest_id: &str,
    room: &str,
) -> GuestPanel {
    let guest_id = guest_id.trim();
    if guest_id.is_empty() || guest_id == "None" {
        return GuestPanel::Error(MISSING_ID_MESSAGE.to_string());
    }

    match service.guest_details(guest_id).await {
        Ok(response) if response.success => match response.data {
            Some(data) => GuestPanel::Content(guest_card(data, room)),
            None => GuestPanel::Error(UNKNOWN_ERROR_MESSAGE.to_string()),
        },
        Ok(response) => {
            let message = response
                .error
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string());
            error!("Guest details rejected: {}", message);
            GuestPanel::Error(message)
        }
        Err(PortError::NotFound(_)) => GuestPanel::Error(NOT_FOUND_MESSAGE.to_string()),
        Err(e) => {
            error!("Guest details failed: {}", e);
            GuestPanel::Error(e.to_string())
        }
    }
}

fn or_dash(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn guest_card(data: GuestDetailsData, room: &str) -> GuestCard {
    let guest = data.guest;
    let info = guest.personal_info;
    let contact = info.contact.unwrap_or_default();
    let stay = guest.stay_info.unwrap_or_default();
    let money = guest.financials.unwrap_or_default();

    let address = info
        .address
        .map(|a| {
            [a.street, a.city, a.state]
                .into_iter()
                .flatten()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| "Endereço não cadastrado".to_string());

    GuestCard {
        name: info.name,
        ficha_number: or_dash(guest.ficha_number, "N/A"),
        document: or_dash(info.doc_id, "Não informado"),
        birth_date: or_dash(info.birth_date, "-"),
        email: or_dash(contact.email, "-"),
        phone: or_dash(contact.phone, "-"),
        address,
        room: room.to_string(),
        status: "Hospedado".to_string(),
        checkin: or_dash(stay.checkin_date, "-"),
        checkout: or_dash(stay.checkout_date, "-"),
        total_consumed: format_brl(money.amount_due.unwrap_or(0.0)),
        total_paid: format_brl(money.paid_amount.unwrap_or(0.0)),
        balance: format_brl(money.balance.unwrap_or(0.0)),
        history: data.history.into_iter().map(stay_line).collect(),
    }
}

fn stay_line(entry: StayHistoryEntry) -> StayLine {
    let status = match entry.status.as_deref() {
        Some("active") => "Hospedado".to_string(),
        Some("checked_out") => "Finalizado".to_string(),
        Some("cancelled") => "Cancelado".to_string(),
        Some(other) if !other.is_empty() => other.to_string(),
        _ => "N/A".to_string(),
    };
    StayLine {
        checkin: or_dash(entry.checkin, "-"),
        room: or_dash(entry.room, "-"),
        total: format_brl(entry.total.unwrap_or(0.0)),
        status,
    }
}

/// Formats an amount as Brazilian reais: `R$ 1.234,56`.
pub fn format_brl(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GuestDetailsResponse;
    use crate::ports::PortResult;
    use async_trait::async_trait;
    use futures::executor::block_on;

    struct FakeGuests(fn() -> PortResult<GuestDetailsResponse>);

    #[async_trait]
    impl GuestDetailsService for FakeGuests {
        async fn guest_details(&self, _guest_id: &str) -> PortResult<GuestDetailsResponse> {
            (self.0)()
        }
    }

    fn full_payload() -> PortResult<GuestDetailsResponse> {
        let json = r#"{
            "success": true,
            "data": {
                "guest": {
                    "ficha_number": "F-102",
                    "personal_info": {
                        "name": "Maria Souza",
                        "doc_id": "123.456.789-00",
                        "contact": {"email": "maria@example.com"},
                        "address": {"street": "Rua A", "city": "Maceió", "state": ""}
                    },
                    "stay_info": {"checkin_date": "2024-05-01"},
                    "financials": {"amount_due": 1234.5, "paid_amount": 1000, "balance": 234.5}
                },
                "history": [
                    {"checkin": "2023-12-20", "room": "12", "total": 800, "status": "checked_out"},
                    {"status": "no_show"},
                    {}
                ]
            }
        }"#;
        Ok(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn formats_reais() {
        assert_eq!(format_brl(0.0), "R$ 0,00");
        assert_eq!(format_brl(1234.5), "R$ 1.234,50");
        assert_eq!(format_brl(1234567.891), "R$ 1.234.567,89");
        assert_eq!(format_brl(-12.0), "-R$ 12,00");
    }

    #[test]
    fn missing_id_short_circuits() {
        let service = FakeGuests(|| panic!("must not be called"));
        assert_eq!(
            block_on(load_guest_panel(&service, "None", "101")),
            GuestPanel::Error(MISSING_ID_MESSAGE.into())
        );
    }

    #[test]
    fn full_payload_builds_the_card() {
        let panel = block_on(load_guest_panel(&FakeGuests(full_payload), "42", "101"));
        let GuestPanel::Content(card) = panel else {
            panic!("expected content");
        };
        assert_eq!(card.name, "Maria Souza");
        assert_eq!(card.ficha_number, "F-102");
        assert_eq!(card.phone, "-");
        assert_eq!(card.birth_date, "-");
        assert_eq!(card.address, "Rua A, Maceió");
        assert_eq!(card.room, "101");
        assert_eq!(card.checkout, "-");
        assert_eq!(card.total_consumed, "R$ 1.234,50");
        assert_eq!(card.history[0].status, "Finalizado");
        assert_eq!(card.history[0].total, "R$ 800,00");
        assert_eq!(card.history[1].status, "no_show");
        assert_eq!(card.history[2].status, "N/A");
    }

    #[test]
    fn unsuccessful_response_shows_its_error() {
        let service = FakeGuests(|| {
            Ok(GuestDetailsResponse {
                success: false,
                error: Some("Reserva inválida".into()),
                data: None,
            })
        });
        assert_eq!(
            block_on(load_guest_panel(&service, "42", "101")),
            GuestPanel::Error("Reserva inválida".into())
        );
    }

    #[test]
    fn not_found_status_shows_not_found() {
        let service = FakeGuests(|| Err(PortError::NotFound("404".into())));
        assert_eq!(
            block_on(load_guest_panel(&service, "42", "101")),
            GuestPanel::Error(NOT_FOUND_MESSAGE.into())
        );
    }

    #[test]
    fn empty_address_gets_placeholder() {
        let service = FakeGuests(|| {
            Ok(serde_json::from_str(
                r#"{"success": true, "data": {"guest": {"personal_info": {"name": "Ana"}}, "history": []}}"#,
            )
            .unwrap())
        });
        let GuestPanel::Content(card) = block_on(load_guest_panel(&service, "7", "3")) else {
            panic!("expected content");
        };
        assert_eq!(card.address, "Endereço não cadastrado");
        assert_eq!(card.document, "Não informado");
        assert!(card.history.is_empty());
    }
}
