//! services/station/src/console/session.rs
//!
//! The interactive counter session.
//!
//! The session owns the inventory store for as long as the operator is at the
//! terminal. It reads one line at a time, drives the store, and renders the
//! projections back. Collaborator lookups (CEP and guest details) are async and
//! are driven to completion on the runtime handle the session was given.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use laundry_core::address::autofill_address;
use laundry_core::guest::load_guest_panel;
use laundry_core::projections::brand_suggestions;
use laundry_core::scan_input::{normalize, GroupScanList, ScanBuffer};
use laundry_core::{
    AddressLookupService, ArchiveOutcome, BrandOutcome, ConfirmationService, GuestDetailsService,
    InventoryStore, ProductForm, ScanOutcome, StoreError,
};
use tokio::runtime::Handle;
use tracing::{debug, info};

use super::protocol::{parse_line, Command, Input};
use super::render;

/// The async collaborators the session calls out to.
pub struct Services {
    pub address: Arc<dyn AddressLookupService>,
    pub guests: Arc<dyn GuestDetailsService>,
    pub runtime: Handle,
    /// Pause between showing a new unregistered row and opening its form.
    pub registration_prompt_delay: Duration,
}

//=========================================================================================
// Terminal I/O
//=========================================================================================

/// Line-oriented prompts over a reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Next line without its terminator, or `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Asks for a value, keeping `current` when the answer is blank.
    fn ask(&mut self, label: &str, current: &str) -> io::Result<String> {
        write!(self.output, "{} [{}]: ", label, current)?;
        self.output.flush()?;
        let answer = self.read_line()?.unwrap_or_default();
        let answer = answer.trim();
        Ok(if answer.is_empty() {
            current.to_string()
        } else {
            answer.to_string()
        })
    }

    /// Like [`Prompter::ask`], but a number picks from `options` (1-based).
    fn choose(&mut self, label: &str, options: &[String], current: &str) -> io::Result<String> {
        if !options.is_empty() {
            let listed: Vec<String> = options
                .iter()
                .enumerate()
                .map(|(i, o)| format!("{}) {}", i + 1, o))
                .collect();
            writeln!(self.output, "{}", listed.join("  "))?;
        }
        let answer = self.ask(label, current)?;
        let picked = answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| options.get(i));
        Ok(picked.cloned().unwrap_or(answer))
    }
}

impl<R: BufRead, W: Write> ConfirmationService for Prompter<R, W> {
    fn confirm(&mut self, prompt: &str) -> bool {
        if write!(self.output, "{} [s/N] ", prompt)
            .and_then(|_| self.output.flush())
            .is_err()
        {
            return false;
        }
        match self.read_line() {
            Ok(Some(answer)) => matches!(
                answer.trim().to_lowercase().as_str(),
                "s" | "sim" | "y" | "yes"
            ),
            _ => false,
        }
    }
}

//=========================================================================================
// The Session
//=========================================================================================

pub struct ConsoleSession<R, W> {
    store: InventoryStore,
    io: Prompter<R, W>,
    buffer: ScanBuffer,
    services: Services,
}

impl<R: BufRead, W: Write> ConsoleSession<R, W> {
    pub fn new(store: InventoryStore, input: R, output: W, services: Services) -> Self {
        Self {
            store,
            io: Prompter::new(input, output),
            buffer: ScanBuffer::new(),
            services,
        }
    }

    /// Runs until `/quit` or end of input, then hands the store back.
    pub fn run(mut self) -> io::Result<InventoryStore> {
        writeln!(self.io.output, "Digite /help para ver os comandos.")?;
        render::render_active_bag(&mut self.io.output, self.store.state())?;

        while let Some(line) = self.io.read_line()? {
            if !self.handle_line(&line)? {
                break;
            }
        }
        self.io.output.flush()?;
        info!("Console session ended.");
        Ok(self.store)
    }

    /// Handles one line. Returns `false` when the operator asked to quit.
    fn handle_line(&mut self, line: &str) -> io::Result<bool> {
        match parse_line(line) {
            Input::Scan(text) => {
                let mut entries = self.buffer.push_str(&text);
                entries.extend(self.buffer.flush());
                for entry in entries {
                    self.scan(&entry)?;
                }
            }
            Input::Command(Command::Quit) => return Ok(false),
            Input::Command(command) => self.command(command)?,
        }
        Ok(true)
    }

    fn scan(&mut self, entry: &str) -> io::Result<()> {
        match self.store.add_scan(entry) {
            ScanOutcome::Accepted {
                rfid,
                needs_registration,
            } => {
                render::render_active_bag(&mut self.io.output, self.store.state())?;
                if needs_registration {
                    self.io.output.flush()?;
                    std::thread::sleep(self.services.registration_prompt_delay);
                    writeln!(self.io.output, "Item não cadastrado: {}", rfid)?;
                    self.edit_product(&rfid)?;
                }
            }
            // Already logged by the store; the operator keeps scanning.
            ScanOutcome::Duplicate { rfid } => debug!(%rfid, "Duplicate read ignored"),
            ScanOutcome::Ignored => {}
        }
        Ok(())
    }

    fn command(&mut self, command: Command) -> io::Result<()> {
        match command {
            Command::Remove(raw) => {
                let rfid = normalize(&raw);
                if !self.store.state().has_active_scan(&rfid) {
                    writeln!(self.io.output, "Tag não está na sacola atual.")?;
                } else if self.store.remove_scan(&rfid, &mut self.io) {
                    render::render_active_bag(&mut self.io.output, self.store.state())?;
                }
            }
            Command::Edit(raw) => self.edit_product(&normalize(&raw))?,
            Command::Group => self.group_registration()?,
            Command::Archive => match self.store.archive_active_bag(&mut self.io) {
                Ok(ArchiveOutcome::Archived {
                    name,
                    item_count,
                    next_bag_name,
                }) => writeln!(
                    self.io.output,
                    "Sacola \"{}\" arquivada com {} itens. Próxima sacola: {}",
                    name, item_count, next_bag_name
                )?,
                Ok(ArchiveOutcome::Cancelled) => {}
                Err(e) => writeln!(self.io.output, "! {}", e)?,
            },
            Command::Clear => {
                if self.store.clear_active_bag(&mut self.io) {
                    render::render_active_bag(&mut self.io.output, self.store.state())?;
                }
            }
            Command::Brand(name) => {
                let name = match name {
                    Some(name) => name,
                    None => self.io.ask("Nova marca", "")?,
                };
                match self.store.add_brand(&name) {
                    BrandOutcome::Added => {
                        writeln!(self.io.output, "Marca \"{}\" adicionada.", name.trim())?
                    }
                    BrandOutcome::AlreadyExists => {
                        writeln!(self.io.output, "Esta marca já existe.")?
                    }
                    BrandOutcome::Empty => {}
                }
            }
            Command::List => render::render_active_bag(&mut self.io.output, self.store.state())?,
            Command::Catalog => render::render_catalog(&mut self.io.output, self.store.state())?,
            Command::Brands => render::render_brands(&mut self.io.output, self.store.state())?,
            Command::Cep(raw) => {
                let lookup = self.services.address.clone();
                let fill = self
                    .services
                    .runtime
                    .block_on(async move { autofill_address(lookup.as_ref(), &raw).await });
                match fill {
                    Some(fill) => render::render_address(&mut self.io.output, &fill)?,
                    None => writeln!(self.io.output, "Informe um CEP com 8 dígitos.")?,
                }
            }
            Command::Guest { id, room } => {
                let guests = self.services.guests.clone();
                let panel = self
                    .services
                    .runtime
                    .block_on(async move { load_guest_panel(guests.as_ref(), &id, &room).await });
                render::render_guest(&mut self.io.output, &panel)?;
            }
            Command::Help => write!(self.io.output, "{}", render::HELP)?,
            Command::Unknown(text) => writeln!(
                self.io.output,
                "Comando desconhecido: {}. Digite /help.",
                text
            )?,
            Command::Quit => {}
        }
        Ok(())
    }

    //-------------------------------------------------------------------------------------
    // Registration Flows
    //-------------------------------------------------------------------------------------

    /// Walks the operator through the form, pre-filled from `form`.
    fn fill_form(&mut self, mut form: ProductForm) -> io::Result<ProductForm> {
        let categories = self.store.categories();
        let category = self.io.choose("Categoria", &categories, &form.category)?;
        let names = self.store.names_for(&category);
        if category != form.category && !names.contains(&form.name) {
            form.name = names.first().cloned().unwrap_or_default();
        }
        form.category = category;
        form.name = self.io.choose("Item", &names, &form.name)?;

        let brands = brand_suggestions(self.store.state());
        if !brands.is_empty() {
            writeln!(self.io.output, "Marcas: {}", brands.join(", "))?;
        }
        form.brand = self.io.ask("Marca", &form.brand)?;
        form.acquisition_date = self.io.ask("Data de aquisição", &form.acquisition_date)?;
        form.wash_price = self.io.ask("Preço lavagem", &form.wash_price)?;
        form.item_price = self.io.ask("Preço item", &form.item_price)?;
        form.destination = self.io.ask("Destino", &form.destination)?;
        Ok(form)
    }

    fn edit_product(&mut self, rfid: &str) -> io::Result<()> {
        if rfid.is_empty() {
            return Ok(());
        }
        writeln!(self.io.output, "Cadastro do item {}", rfid)?;
        let current = self.store.product_form_for(rfid);
        let form = self.fill_form(current)?;
        if self.io.confirm("Salvar cadastro?") {
            self.store.register_product(rfid, &form);
            writeln!(self.io.output, "Item salvo.")?;
        }
        Ok(())
    }

    fn group_registration(&mut self) -> io::Result<()> {
        writeln!(
            self.io.output,
            "Cadastro em grupo: escaneie as tags (linha vazia termina, -<tag> remove)."
        )?;
        let mut group = GroupScanList::new();
        let mut buffer = ScanBuffer::new();
        while let Some(line) = self.io.read_line()? {
            if line.trim().is_empty() {
                break;
            }
            if let Some(tag) = line.trim().strip_prefix('-') {
                group.remove(&normalize(tag));
            } else {
                let mut entries = buffer.push_str(&line);
                entries.extend(buffer.flush());
                for entry in entries {
                    group.push(&entry);
                }
            }
            writeln!(self.io.output, "{} tags no grupo.", group.len())?;
        }

        if group.is_empty() {
            writeln!(self.io.output, "! {}", StoreError::EmptyGroup)?;
            return Ok(());
        }
        let defaults = self.store.default_form();
        let form = self.fill_form(defaults)?;
        match self.store.register_group(group.tags(), &form) {
            Ok(count) => writeln!(self.io.output, "{} itens registrados com sucesso!", count)?,
            Err(e) => writeln!(self.io.output, "! {}", e)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use laundry_core::domain::{CepLookupResponse, GuestDetailsResponse, LaundryState, PostalAddress, StoredState};
    use laundry_core::{Clock, LocalStateStore, MirrorOutbox, PortError, PortResult};
    use std::io::Cursor;
    use std::sync::Mutex;
    use uuid::Uuid;

    const TAG_A: &str = "E00000000000000000000001";
    const TAG_B: &str = "E00000000000000000000002";

    #[derive(Default)]
    struct NullStore;

    impl LocalStateStore for NullStore {
        fn load(&self) -> PortResult<Option<StoredState>> {
            Ok(None)
        }
        fn save(&self, _state: &LaundryState) -> PortResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingOutbox(Mutex<usize>);

    impl MirrorOutbox for CountingOutbox {
        fn enqueue(&self, _state: LaundryState) -> Uuid {
            *self.0.lock().unwrap() += 1;
            Uuid::new_v4()
        }
    }

    struct MayFirst;

    impl Clock for MayFirst {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
        }
        fn today(&self) -> NaiveDate {
            self.now().date_naive()
        }
    }

    struct StubCep;

    #[async_trait]
    impl AddressLookupService for StubCep {
        async fn lookup_cep(&self, cep: &str) -> PortResult<CepLookupResponse> {
            if cep == "45810000" {
                Ok(CepLookupResponse {
                    valid: true,
                    data: Some(PostalAddress {
                        street: "Av. Beira Mar".into(),
                        neighborhood: "Centro".into(),
                        city: "Porto Seguro".into(),
                        state: "BA".into(),
                    }),
                    message: None,
                })
            } else {
                Err(PortError::Unexpected("timeout".into()))
            }
        }
    }

    struct MissingGuest;

    #[async_trait]
    impl GuestDetailsService for MissingGuest {
        async fn guest_details(&self, guest_id: &str) -> PortResult<GuestDetailsResponse> {
            Err(PortError::NotFound(guest_id.to_string()))
        }
    }

    struct Outcome {
        store: InventoryStore,
        output: String,
        mirrored: usize,
    }

    fn run_session(input: &str) -> Outcome {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let outbox = Arc::new(CountingOutbox::default());
        let store = InventoryStore::new(
            LaundryState::default(),
            Arc::new(NullStore),
            outbox.clone(),
            Arc::new(MayFirst),
        );
        let services = Services {
            address: Arc::new(StubCep),
            guests: Arc::new(MissingGuest),
            runtime: runtime.handle().clone(),
            registration_prompt_delay: Duration::ZERO,
        };
        let mut output = Vec::new();
        let store = ConsoleSession::new(store, Cursor::new(input.to_string()), &mut output, services)
            .run()
            .unwrap();
        let mirrored = *outbox.0.lock().unwrap();
        Outcome {
            store,
            output: String::from_utf8(output).unwrap(),
            mirrored,
        }
    }

    /// Answers that walk the registration form and save it: category 4,
    /// default item, brand, default date, prices, default destination.
    fn form_answers(brand: &str) -> String {
        format!("4\n\n{}\n\n3\n20\n\ns\n", brand)
    }

    #[test]
    fn new_tag_opens_the_registration_form() {
        let input = format!("{}\n{}/quit\n", TAG_A, form_answers("Teka"));
        let out = run_session(&input);

        let state = out.store.state();
        assert_eq!(state.scans.len(), 1);
        let record = &state.products[TAG_A];
        assert_eq!(record.category, "Fronha");
        assert_eq!(record.name, "Fronha");
        assert_eq!(record.brand, "Teka");
        assert_eq!(record.wash_price, 3.0);
        assert_eq!(record.item_price, 20.0);
        assert_eq!(record.destination, "Almareia");
        assert!(out.output.contains("Item não cadastrado"));
        assert!(out.output.contains("Item salvo."));
        // Scan, then registration.
        assert_eq!(out.mirrored, 2);
    }

    #[test]
    fn declined_form_leaves_the_tag_pending() {
        let input = format!("{}\n\n\n\n\n\n\nn\n", TAG_A);
        let out = run_session(&input);
        assert_eq!(out.store.state().scans.len(), 1);
        assert!(out.store.state().products.is_empty());
    }

    #[test]
    fn duplicate_reads_are_silently_dropped() {
        let decline = "\n\n\n\n\n\n\nn\n";
        let input = format!("{TAG_A}\n{decline}{TAG_A}\n");
        let out = run_session(&input);
        assert_eq!(out.store.state().scans.len(), 1);
        assert_eq!(out.output.matches("Item não cadastrado").count(), 1);
    }

    #[test]
    fn streamed_tags_on_one_line_are_split() {
        let decline = "\n\n\n\n\n\n\nn\n";
        let input = format!("{TAG_A}{TAG_B}\n{decline}{decline}");
        let out = run_session(&input);
        let scans = &out.store.state().scans;
        assert_eq!(scans.len(), 2);
        assert_eq!(scans[0].rfid, TAG_B);
    }

    #[test]
    fn group_registration_applies_one_form() {
        let input = format!(
            "/group\n{TAG_A}\n{TAG_B}\nnot-a-tag\n-{TAG_B}\n{TAG_B}\n\n{}",
            form_answers("Santista")
        );
        let out = run_session(&input);

        let state = out.store.state();
        assert_eq!(state.products.len(), 2);
        assert_eq!(state.products[TAG_B].brand, "Santista");
        assert_eq!(state.scans.len(), 2);
        assert!(out.output.contains("2 itens registrados com sucesso!"));
    }

    #[test]
    fn empty_group_is_refused() {
        let out = run_session("/group\n\n");
        assert!(out.output.contains("! Nenhuma tag escaneada."));
        assert!(out.store.state().products.is_empty());
    }

    #[test]
    fn archive_asks_then_relabels() {
        let decline = "\n\n\n\n\n\n\nn\n";
        let input = format!("{TAG_A}\n{decline}/archive\ns\n");
        let out = run_session(&input);
        assert!(out
            .output
            .contains("Sacola \"01-05-24 01\" arquivada com 1 itens. Próxima sacola: 01-05-24 02"));
        assert_eq!(out.store.state().bag_history.len(), 1);
        assert!(out.store.state().scans.is_empty());
    }

    #[test]
    fn archive_of_an_empty_bag_alerts() {
        let out = run_session("/archive\n");
        assert!(out.output.contains("! Nenhum item nesta sacola."));
    }

    #[test]
    fn brands_are_added_once() {
        let out = run_session("/brand Teka\n/brand\nTeka\n/brands\n");
        assert!(out.output.contains("Marca \"Teka\" adicionada."));
        assert!(out.output.contains("Esta marca já existe."));
        assert_eq!(out.store.state().brands, vec!["Teka".to_string()]);
    }

    #[test]
    fn cep_lookup_fills_or_alerts() {
        let out = run_session("/cep 45810-000\n/cep 01001000\n/cep 123\n");
        assert!(out.output.contains("Av. Beira Mar, Centro - Porto Seguro/BA"));
        assert!(out.output.contains("! Erro ao consultar CEP."));
        assert!(out.output.contains("Informe um CEP com 8 dígitos."));
    }

    #[test]
    fn guest_panel_shows_errors_inline() {
        let out = run_session("/guest 77 101\n/guest\n");
        assert!(out.output.contains("Hóspede não encontrado"));
        assert!(out
            .output
            .contains("ID do hóspede não encontrado. É um registro antigo?"));
    }

    #[test]
    fn quit_stops_reading() {
        let out = run_session(&format!("/quit\n{TAG_A}\n"));
        assert!(out.store.state().scans.is_empty());
    }
}
