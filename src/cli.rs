// SPDX-License-Identifier: MPL-2.0

use crate::admin::{
    self, AlertForm, BannerForm, CompanyForm, EntityForm, EntityKind, OnCallForm, SettingsForm,
};
use crate::app::GuiaApp;
use crate::cache::CacheDb;
use crate::carousel::Carousel;
use crate::config::{APP_NAME, AppConfig, SUPPORTED_CITIES, find_city};
use crate::links::{self, SocialPlatform};
use crate::listing::{self, ListingFilter};
use crate::model::Company;
use crate::relay::{self, WebPushDelivery};
use crate::runtime;
use crate::state::{PreferenceStore, SyncOutcome, Theme};
use crate::supabase::GuiaClient;
use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "guia", version, about = "Guia Digital city directory")]
pub struct Cli {
    /// Use cached data only, without contacting the store
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the push notification relay
    Serve {
        /// Overrides PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Show the selected city, or select another one
    City { id: Option<String> },
    /// Refresh the selected city from the store
    Sync {
        /// Drop the offline copy before fetching
        #[arg(long)]
        fresh: bool,
    },
    /// List companies, optionally narrowed by text and category
    List {
        #[arg(short, long, default_value = "")]
        search: String,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(long)]
        featured: bool,
    },
    /// Company details
    Show { id: String },
    Favorites,
    /// Add or remove a favorite company
    Favorite { id: String },
    /// Toggle the theme, or set it explicitly
    Theme {
        #[arg(value_enum)]
        theme: Option<ThemeArg>,
    },
    /// Contact links for a company
    Contact {
        id: String,
        #[arg(long)]
        message: Option<String>,
        /// Open the WhatsApp link in the browser
        #[arg(long)]
        open: bool,
    },
    /// Active banners in display order
    Carousel,
    /// Pharmacy on duty
    OnCall,
    Alerts,
    Notifications,
    /// Register a push subscription (JSON file) with the relay
    Push {
        subscription: PathBuf,
        #[arg(long, default_value = "http://localhost:3000/")]
        relay: Url,
    },
    /// Dashboard operations; requires an admin account
    Admin(AdminArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

#[derive(Args, Debug)]
struct AdminArgs {
    #[arg(long, env = "GUIA_ADMIN_EMAIL")]
    email: String,
    #[arg(long, env = "GUIA_ADMIN_PASSWORD", hide_env_values = true)]
    password: String,
    #[command(subcommand)]
    action: AdminAction,
}

#[derive(Subcommand, Debug)]
enum AdminAction {
    /// Create a company, or update it with --id
    Company(CompanyArgs),
    Banner(BannerArgs),
    Alert(AlertArgs),
    /// Set the pharmacy on duty
    OnCall(OnCallArgs),
    /// Contact details shown in the footer
    Settings(SettingsArgs),
    Delete {
        #[arg(value_enum)]
        kind: KindArg,
        id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Company,
    Banner,
    Alert,
}

impl From<KindArg> for EntityKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Company => EntityKind::Company,
            KindArg::Banner => EntityKind::Banner,
            KindArg::Alert => EntityKind::Alert,
        }
    }
}

#[derive(Args, Debug)]
struct CompanyArgs {
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    name: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    category: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    address: String,
    /// Logo URL
    #[arg(long, default_value = "")]
    logo: String,
    /// Logo image to embed instead of a URL
    #[arg(long, conflicts_with = "logo")]
    logo_file: Option<PathBuf>,
    #[arg(long)]
    featured: bool,
    #[arg(long, default_value = "")]
    instagram: String,
    #[arg(long, default_value = "")]
    facebook: String,
    #[arg(long, default_value = "")]
    city: String,
}

#[derive(Args, Debug)]
struct BannerArgs {
    #[arg(long)]
    id: Option<String>,
    #[arg(long, default_value = "")]
    image_url: String,
    #[arg(long, conflicts_with = "image_url")]
    image_file: Option<PathBuf>,
    #[arg(long, default_value = "")]
    link: String,
    #[arg(long)]
    inactive: bool,
    #[arg(long, default_value = "0")]
    order: String,
    /// Show the banner in every city
    #[arg(long)]
    global: bool,
}

#[derive(Args, Debug)]
struct AlertArgs {
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    image_url: String,
    #[arg(long, conflicts_with = "image_url")]
    image_file: Option<PathBuf>,
    #[arg(long, default_value = "")]
    link: String,
    #[arg(long)]
    inactive: bool,
    #[arg(long, default_value = "")]
    city: String,
}

#[derive(Args, Debug)]
struct OnCallArgs {
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    pharmacy: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    address: String,
}

#[derive(Args, Debug)]
struct SettingsArgs {
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    address: String,
    #[arg(long, default_value = "")]
    whatsapp: String,
    #[arg(long, default_value = "")]
    instagram: String,
    #[arg(long, default_value = "")]
    facebook: String,
}

/// Uploaded file wins over the URL field
fn image_field(url: String, file: Option<PathBuf>) -> anyhow::Result<String> {
    match file {
        Some(path) => admin::encode_image(&path)
            .with_context(|| format!("failed to load {}", path.display())),
        None => Ok(url),
    }
}

/// A dashboard action with every local input (image files included) resolved
#[derive(Debug)]
enum AdminStep {
    Save(EntityForm),
    Delete {
        kind: EntityKind,
        id: String,
        confirmed: bool,
    },
}

impl AdminAction {
    fn prepare(self) -> anyhow::Result<AdminStep> {
        let form = match self {
            AdminAction::Company(a) => EntityForm::Company(CompanyForm {
                id: a.id,
                name: a.name,
                phone: a.phone,
                category: a.category,
                description: a.description,
                address: a.address,
                logo: image_field(a.logo, a.logo_file)?,
                is_featured: a.featured,
                instagram: a.instagram,
                facebook: a.facebook,
                city: a.city,
            }),
            AdminAction::Banner(a) => EntityForm::Banner(BannerForm {
                id: a.id,
                image_url: image_field(a.image_url, a.image_file)?,
                link: a.link,
                active: !a.inactive,
                order: a.order,
                global: a.global,
            }),
            AdminAction::Alert(a) => EntityForm::Alert(AlertForm {
                id: a.id,
                title: a.title,
                description: a.description,
                image_url: image_field(a.image_url, a.image_file)?,
                link: a.link,
                active: !a.inactive,
                city: a.city,
            }),
            AdminAction::OnCall(a) => EntityForm::OnCall(OnCallForm {
                id: a.id,
                pharmacy_name: a.pharmacy,
                phone: a.phone,
                address: a.address,
            }),
            AdminAction::Settings(a) => EntityForm::Settings(SettingsForm {
                id: a.id,
                phone: a.phone,
                email: a.email,
                address: a.address,
                whatsapp: a.whatsapp,
                instagram: a.instagram,
                facebook: a.facebook,
            }),
            AdminAction::Delete { kind, id, yes } => {
                return Ok(AdminStep::Delete {
                    kind: kind.into(),
                    id,
                    confirmed: yes,
                });
            }
        };
        Ok(AdminStep::Save(form))
    }
}

fn require_online(offline: bool, what: &str) -> anyhow::Result<()> {
    if offline {
        bail!("{what} needs the store");
    }
    Ok(())
}

fn open_app(config: &AppConfig) -> anyhow::Result<GuiaApp<GuiaClient>> {
    let client = GuiaClient::from_config(config)?;
    let prefs = PreferenceStore::open_default()?;

    let cache = match CacheDb::open_default() {
        Ok(db) => {
            match db.cleanup_stale() {
                Ok(0) => {}
                Ok(n) => tracing::debug!("removed {n} stale cached collections"),
                Err(e) => tracing::warn!("cache cleanup failed: {e}"),
            }
            Some(db)
        }
        Err(e) => {
            tracing::warn!("offline cache unavailable: {e}");
            None
        }
    };

    Ok(GuiaApp::new(client, prefs, cache))
}

fn print_company_line(company: &Company, favorite: bool) {
    let star = if favorite { "*" } else { " " };
    let featured = if company.is_featured { " [destaque]" } else { "" };
    println!(
        "{star} {:<10} {:<32} {:<16} {}{featured}",
        company.id, company.name, company.category, company.phone
    );
}

fn sync_selected(app: &GuiaApp<GuiaClient>) -> anyhow::Result<()> {
    match runtime::block_on(app.refresh())? {
        SyncOutcome::Applied(report) => {
            for (table, reason) in &report.failed {
                eprintln!("aviso: {table} não atualizado ({reason})");
            }
        }
        SyncOutcome::Superseded => tracing::debug!("sync superseded"),
    }
    Ok(())
}

fn serve(config: &AppConfig, port: Option<u16>) -> anyhow::Result<()> {
    let mut addr = config.relay_addr;
    if let Some(port) = port {
        addr.set_port(port);
    }
    let push = WebPushDelivery::new(config.vapid.clone())?;
    relay::serve(addr, &push)?;
    Ok(())
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    let command = match cli.command {
        Command::Serve { port } => return serve(&config, port),
        command => command,
    };

    let mut app = open_app(&config)?;

    match command {
        Command::City { id: None } => {
            match app.city().and_then(find_city) {
                Some(city) => println!("{} - {}", city.name, city.state),
                None => println!("Nenhuma cidade selecionada"),
            }
            println!();
            for city in SUPPORTED_CITIES {
                let mark = if app.city() == Some(city.id) { ">" } else { " " };
                println!("{mark} {:<12} {} - {}", city.id, city.name, city.state);
            }
        }
        Command::City { id: Some(id) } => {
            require_online(cli.offline, "selecting a city")?;
            runtime::block_on(app.select_city(&id))?;
            let count = app.snapshot().companies.len();
            println!("{APP_NAME}: {id} ({count} empresas)");
        }
        Command::Sync { fresh } => {
            require_online(cli.offline, "sync")?;
            if fresh {
                app.clear_cached()?;
            }
            sync_selected(&app)?;
            let snapshot = app.snapshot();
            println!(
                "{} empresas, {} alertas, {} notificações, {} banners",
                snapshot.companies.len(),
                snapshot.alerts.len(),
                snapshot.notifications.len(),
                snapshot.banners.len()
            );
        }
        command => {
            if app.city().is_none() {
                bail!("no city selected; run `guia city <id>` first");
            }
            if !cli.offline {
                sync_selected(&app)?;
            }
            run_with_city(&mut app, command)?;
        }
    }
    Ok(())
}

fn run_with_city(app: &mut GuiaApp<GuiaClient>, command: Command) -> anyhow::Result<()> {
    let snapshot = app.snapshot();

    match command {
        Command::List {
            search,
            category,
            featured,
        } => {
            let filter = ListingFilter::new(&search, category.as_deref());
            if !filter.is_searching() {
                for alert in listing::active_alerts(&snapshot.alerts) {
                    println!("! {}", alert.title);
                }
                println!("Categorias: {}", listing::categories(&snapshot.companies).join(", "));
            }
            let companies = if featured {
                listing::featured(&snapshot.companies)
            } else {
                filter.apply(&snapshot.companies)
            };
            if companies.is_empty() {
                println!("Nenhuma empresa encontrada");
            }
            for company in companies {
                print_company_line(company, app.preferences().is_favorite(&company.id));
            }
        }
        Command::Show { id } => {
            let Some(company) = listing::find_company(&snapshot.companies, &id) else {
                bail!("company {id} not found");
            };
            println!("{}", company.name);
            println!("Categoria: {}", company.category);
            println!("Telefone: {}", company.phone);
            if let Some(address) = &company.address {
                println!("Endereço: {address}");
            }
            if let Some(description) = &company.description {
                println!();
                println!("{description}");
            }
            if app.preferences().is_favorite(&company.id) {
                println!("(favorito)");
            }
        }
        Command::Favorites => {
            let favorites =
                listing::favorite_companies(&snapshot.companies, &app.preferences().favorites);
            if favorites.is_empty() {
                println!("Nenhum favorito ainda");
            }
            for company in favorites {
                print_company_line(company, true);
            }
        }
        Command::Favorite { id } => {
            if app.toggle_favorite(&id)? {
                println!("{id} adicionado aos favoritos");
            } else {
                println!("{id} removido dos favoritos");
            }
        }
        Command::Theme { theme } => {
            let theme = match theme {
                Some(theme) => {
                    app.set_theme(theme.into())?;
                    theme.into()
                }
                None => app.toggle_theme()?,
            };
            println!("Tema: {}", theme.as_str());
        }
        Command::Contact { id, message, open } => {
            let Some(company) = listing::find_company(&snapshot.companies, &id) else {
                bail!("company {id} not found");
            };
            let whatsapp_number = if company.social.whatsapp.is_empty() {
                &company.phone
            } else {
                &company.social.whatsapp
            };
            let whatsapp = links::whatsapp_link(whatsapp_number, message.as_deref());
            for link in [
                links::phone_link(&company.phone),
                whatsapp.clone(),
                links::social_url(SocialPlatform::Instagram, &company.social.instagram),
                links::social_url(SocialPlatform::Facebook, &company.social.facebook),
            ]
            .into_iter()
            .flatten()
            {
                println!("{link}");
            }
            if open {
                let link = whatsapp.context("company has no WhatsApp number")?;
                open::that(&link).with_context(|| format!("failed to open {link}"))?;
            }
        }
        Command::Carousel => {
            let carousel = Carousel::new(&snapshot.banners);
            if carousel.is_empty() {
                println!("Nenhum banner ativo");
            }
            for (i, banner) in carousel.banners().iter().enumerate() {
                let link = banner.link.as_deref().unwrap_or("-");
                println!("{} {:<3} {} -> {link}", i + 1, banner.order, banner.image_url);
            }
            if let Some(interval) = carousel.autoplay_interval() {
                println!("Troca automática a cada {}s", interval.as_secs());
            }
        }
        Command::OnCall => match &snapshot.on_call {
            Some(duty) => {
                println!("{}", duty.pharmacy_name);
                println!("Telefone: {}", duty.phone);
                println!("Endereço: {}", duty.address);
            }
            None => println!("Nenhuma farmácia de plantão informada"),
        },
        Command::Alerts => {
            for alert in listing::active_alerts(&snapshot.alerts) {
                println!("{}", alert.title);
                if let Some(description) = &alert.description {
                    println!("  {description}");
                }
            }
        }
        Command::Notifications => {
            if snapshot.notifications.is_empty() {
                println!("Nenhuma notificação");
            }
            for notification in &snapshot.notifications {
                println!("[{:?}] {}", notification.category, notification.title);
                println!("  {}", notification.message);
            }
        }
        Command::Push {
            subscription,
            relay,
        } => {
            let raw = std::fs::read_to_string(&subscription)
                .with_context(|| format!("failed to read {}", subscription.display()))?;
            let subscription: serde_json::Value =
                serde_json::from_str(&raw).context("subscription is not valid JSON")?;
            runtime::block_on(app.enable_push(&relay, &subscription))?;
            println!("Notificações ativadas com sucesso!");
        }
        Command::Admin(args) => run_admin(app, args)?,
        Command::Serve { .. } | Command::City { .. } | Command::Sync { .. } => {
            unreachable!("handled by run")
        }
    }
    Ok(())
}

/// Local inputs are resolved before signing in, so nothing between sign-in
/// and sign-out can return early.
fn run_admin(app: &GuiaApp<GuiaClient>, args: AdminArgs) -> anyhow::Result<()> {
    let step = args.action.prepare()?;

    let session = runtime::block_on(app.store().sign_in(&args.email, &args.password))?;
    tracing::debug!(user = %session.user_id, "admin session started");

    let result = match step {
        AdminStep::Delete {
            kind,
            id,
            confirmed,
        } => {
            if !confirmed {
                println!("Confirme a exclusão com --yes");
            }
            runtime::block_on(app.remove(kind, &id, confirmed)).map(|deleted| {
                if deleted {
                    println!("Excluído");
                }
            })
        }
        AdminStep::Save(form) => {
            runtime::block_on(app.save(&form)).map(|kind| println!("Salvo ({kind:?})"))
        }
    };

    if let Err(e) = runtime::block_on(app.store().sign_out()) {
        tracing::warn!("sign out failed: {e}");
    }
    Ok(result?)
}
