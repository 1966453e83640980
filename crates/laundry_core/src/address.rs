//! crates/laundry_core/src/address.rs
//!
//! Postal-code (CEP) address auto-fill.

use tracing::error;

use crate::domain::PostalAddress;
use crate::ports::AddressLookupService;

const NOT_FOUND_MESSAGE: &str = "CEP não encontrado.";
const LOOKUP_FAILED_MESSAGE: &str = "Erro ao consultar CEP.";

/// What the address form should do after a lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum AddressFill {
    /// Fill street, neighborhood, city and state, then move focus to the
    /// house number.
    Filled(PostalAddress),
    /// Show a blocking alert; the form is left as it was.
    Alert(String),
}

/// Strips everything but digits. Returns the code only when exactly eight
/// digits remain.
pub fn normalize_cep(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    (digits.len() == 8).then_some(digits)
}

/// Runs the lookup for a CEP field that just lost focus.
///
/// Returns `None` when the field does not hold a complete code, in which case
/// no request is made. Failures are never retried.
pub async fn autofill_address(
    lookup: &dyn AddressLookupService,
    raw: &str,
) -> Option<AddressFill> {
    let cep = normalize_cep(raw)?;
    let fill = match lookup.lookup_cep(&cep).await {
        Ok(response) => match (response.valid, response.data) {
            (true, Some(address)) => AddressFill::Filled(address),
            _ => AddressFill::Alert(
                response
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| NOT_FOUND_MESSAGE.to_string()),
            ),
        },
        Err(e) => {
            error!("CEP Error: {}", e);
            AddressFill::Alert(LOOKUP_FAILED_MESSAGE.to_string())
        }
    };
    Some(fill)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CepLookupResponse;
    use crate::ports::{PortError, PortResult};
    use async_trait::async_trait;
    use futures::executor::block_on;
    use std::sync::Mutex;

    struct FakeLookup {
        answer: fn() -> PortResult<CepLookupResponse>,
        seen: Mutex<Vec<String>>,
    }

    impl FakeLookup {
        fn new(answer: fn() -> PortResult<CepLookupResponse>) -> Self {
            Self {
                answer,
                seen: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl AddressLookupService for FakeLookup {
        async fn lookup_cep(&self, cep: &str) -> PortResult<CepLookupResponse> {
            self.seen.lock().unwrap().push(cep.to_string());
            (self.answer)()
        }
    }

    fn paulista() -> PortResult<CepLookupResponse> {
        Ok(CepLookupResponse {
            valid: true,
            data: Some(PostalAddress {
                street: "Avenida Paulista".into(),
                neighborhood: "Bela Vista".into(),
                city: "São Paulo".into(),
                state: "SP".into(),
            }),
            message: None,
        })
    }

    #[test]
    fn strips_formatting_and_requires_eight_digits() {
        assert_eq!(normalize_cep("01310-100"), Some("01310100".into()));
        assert_eq!(normalize_cep("0131-010"), None);
        assert_eq!(normalize_cep("013101000"), None);
    }

    #[test]
    fn incomplete_code_makes_no_request() {
        let lookup = FakeLookup::new(paulista);
        assert_eq!(block_on(autofill_address(&lookup, "1234")), None);
        assert!(lookup.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn valid_code_fills_the_address() {
        let lookup = FakeLookup::new(paulista);
        let fill = block_on(autofill_address(&lookup, "01310-100")).unwrap();
        match fill {
            AddressFill::Filled(addr) => assert_eq!(addr.city, "São Paulo"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(lookup.seen.lock().unwrap().as_slice(), ["01310100"]);
    }

    #[test]
    fn invalid_code_alerts_with_server_message_or_default() {
        let with_message = FakeLookup::new(|| {
            Ok(CepLookupResponse {
                valid: false,
                data: None,
                message: Some("CEP deve ter 8 dígitos.".into()),
            })
        });
        assert_eq!(
            block_on(autofill_address(&with_message, "00000000")),
            Some(AddressFill::Alert("CEP deve ter 8 dígitos.".into()))
        );

        let bare = FakeLookup::new(|| Ok(CepLookupResponse::default()));
        assert_eq!(
            block_on(autofill_address(&bare, "00000000")),
            Some(AddressFill::Alert(NOT_FOUND_MESSAGE.into()))
        );
    }

    #[test]
    fn transport_failure_alerts_generic_error() {
        let down = FakeLookup::new(|| Err(PortError::Unexpected("timeout".into())));
        assert_eq!(
            block_on(autofill_address(&down, "01310100")),
            Some(AddressFill::Alert(LOOKUP_FAILED_MESSAGE.into()))
        );
    }
}
