//! services/station/src/console/render.rs
//!
//! Plain-text rendering of the read projections for the station terminal.
//! Every function writes to any `Write`, so the session tests can read back
//! exactly what the operator saw.

use chrono::Local;
use laundry_core::address::AddressFill;
use laundry_core::domain::LaundryState;
use laundry_core::guest::GuestPanel;
use laundry_core::projections::{
    active_summary, bag_label, brand_suggestions, catalog, scan_rows, RegistrationStatus,
};
use std::io::{self, Write};

pub const HELP: &str = "\
Comandos:
  <tag>             registra uma leitura na sacola atual
  /rm <tag>         remove a leitura da sacola atual
  /edit <tag>       abre o cadastro do item
  /group            cadastro em grupo (linha vazia termina, -<tag> remove)
  /archive          fecha a sacola atual
  /clear            limpa a lista de leitura atual
  /brand [nome]     adiciona uma marca
  /list             mostra a sacola atual
  /catalog          mostra os itens cadastrados
  /brands           mostra as marcas conhecidas
  /cep <cep>        consulta um endereço
  /guest <id> [qto] mostra os dados de um hóspede
  /help             mostra esta ajuda
  /quit             sai
";

/// Bag label, counters and the newest rows of the active bag.
pub fn render_active_bag(out: &mut impl Write, state: &LaundryState) -> io::Result<()> {
    let label = bag_label(state);
    let summary = active_summary(state);
    writeln!(out, "Sacola: {}", label.name)?;
    writeln!(
        out,
        "Total: {}  Únicos: {}  Duplicados: {}",
        summary.total, summary.unique, summary.duplicates
    )?;

    for row in scan_rows(state) {
        let time = row.scanned_at.with_timezone(&Local).format("%H:%M:%S");
        let description = match (row.status, row.product) {
            (RegistrationStatus::Registered, Some(product)) => {
                if product.brand.is_empty() {
                    format!("{} / {}", product.category, product.name)
                } else {
                    format!("{} / {} ({})", product.category, product.name, product.brand)
                }
            }
            _ => "PENDENTE".to_string(),
        };
        writeln!(
            out,
            "{:>4}  {}  {}  {}  {}",
            row.position, time, row.rfid, row.bag_label, description
        )?;
    }
    Ok(())
}

pub fn render_catalog(out: &mut impl Write, state: &LaundryState) -> io::Result<()> {
    let products = catalog(state);
    if products.is_empty() {
        return writeln!(out, "Nenhum item cadastrado.");
    }
    for p in products {
        writeln!(
            out,
            "{}  {} / {}  {}  lavagem {:.2}  item {:.2}  {}",
            p.rfid, p.category, p.name, p.brand, p.wash_price, p.item_price, p.destination
        )?;
    }
    Ok(())
}

pub fn render_brands(out: &mut impl Write, state: &LaundryState) -> io::Result<()> {
    let brands = brand_suggestions(state);
    if brands.is_empty() {
        return writeln!(out, "Nenhuma marca cadastrada.");
    }
    writeln!(out, "{}", brands.join(", "))
}

pub fn render_address(out: &mut impl Write, fill: &AddressFill) -> io::Result<()> {
    match fill {
        AddressFill::Filled(address) => writeln!(
            out,
            "{}, {} - {}/{}",
            address.street, address.neighborhood, address.city, address.state
        ),
        AddressFill::Alert(message) => writeln!(out, "! {}", message),
    }
}

pub fn render_guest(out: &mut impl Write, panel: &GuestPanel) -> io::Result<()> {
    let card = match panel {
        GuestPanel::Error(message) => return writeln!(out, "{}", message),
        GuestPanel::Content(card) => card,
    };
    writeln!(out, "{}  (Ficha {})", card.name, card.ficha_number)?;
    writeln!(out, "Documento: {}  Nascimento: {}", card.document, card.birth_date)?;
    writeln!(out, "E-mail: {}  Telefone: {}", card.email, card.phone)?;
    writeln!(out, "Endereço: {}", card.address)?;
    writeln!(
        out,
        "Quarto {}  {}  Entrada: {}  Saída: {}",
        card.room, card.status, card.checkin, card.checkout
    )?;
    writeln!(
        out,
        "Consumo: {}  Pago: {}  Saldo: {}",
        card.total_consumed, card.total_paid, card.balance
    )?;
    for stay in &card.history {
        writeln!(
            out,
            "  {}  quarto {}  {}  {}",
            stay.checkin, stay.room, stay.total, stay.status
        )?;
    }
    Ok(())
}
