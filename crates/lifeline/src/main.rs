//! `lifeline` - CLI for the lifeline dashboard
//!
//! This binary signs users in and out, edits their medical profile and
//! emergency contacts, and shows the dashboard and emergency screens.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use lifeline::cli::{Cli, Command, ConfigCommand, ContactsCommand, ProfileCommand};
use lifeline::{
    init_logging, Config, ContactForm, Dashboard, Editor, Error, Screen, Session,
    SessionProvider, Storage,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Configuration commands never touch the database
    match cli.command {
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
        command => run(&config, command).await,
    }
}

async fn run(config: &Config, command: Command) -> anyhow::Result<()> {
    let db_path = config.database_path();
    let storage = Arc::new(
        Storage::open(&db_path)
            .with_context(|| format!("opening record store at {}", db_path.display()))?,
    );
    storage.set_busy_timeout(config.busy_timeout())?;
    let session = Session::init(storage.load_session()?);

    match command {
        Command::Signup => {
            let user = storage.create_user()?;
            storage.save_session(user)?;
            session.sign_in(user);
            println!("{user}");
        }
        Command::Login(login) => {
            if !storage.user_exists(login.user_id)? {
                return Err(Error::UnknownUser {
                    user_id: login.user_id.to_string(),
                }
                .into());
            }
            storage.save_session(login.user_id)?;
            session.sign_in(login.user_id);
            println!("Signed in as {}", login.user_id);
        }
        Command::Logout => {
            storage.clear_session()?;
            if session.sign_out() {
                println!("Signed out.");
            } else {
                println!("Not signed in.");
            }
        }
        Command::Whoami => {
            let user = session.current_user_id().ok_or(Error::NotSignedIn)?;
            println!("{user}");
        }
        Command::Dashboard(args) => {
            let screen = show_dashboard(&storage, &session, false).await?;
            print_screen(&screen, args.json)?;
        }
        Command::Emergency(args) => {
            let screen = show_dashboard(&storage, &session, true).await?;
            print_screen(&screen, args.json)?;
        }
        Command::Profile(profile_cmd) => {
            let editor = Editor::new(&storage, &session, &config.contacts);
            handle_profile(&editor, profile_cmd)?;
        }
        Command::Contacts(contacts_cmd) => {
            let editor = Editor::new(&storage, &session, &config.contacts);
            handle_contacts(&editor, contacts_cmd)?;
        }
        Command::Status(status_cmd) => {
            handle_status(config, &storage, &session, status_cmd.json)?;
        }
        Command::Config(config_cmd) => handle_config(config, config_cmd)?,
    }

    Ok(())
}

async fn show_dashboard(
    storage: &Arc<Storage>,
    session: &Session,
    emergency: bool,
) -> anyhow::Result<Screen> {
    let user = session.current_user_id().ok_or(Error::NotSignedIn)?;

    let mut dashboard = Dashboard::mount(Arc::clone(storage));
    let status = dashboard.load(Some(user)).await;
    for diagnostic in status.diagnostics() {
        eprintln!("warning: {diagnostic}");
    }

    if emergency {
        dashboard.declare_emergency();
    }
    Ok(dashboard.screen())
}

fn print_screen(screen: &Screen, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(screen)
    } else {
        print!("{screen}");
        Ok(())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn handle_profile(editor: &Editor<'_>, cmd: ProfileCommand) -> anyhow::Result<()> {
    match cmd {
        ProfileCommand::Show(args) => {
            let form = editor.load_profile_form()?;
            if args.json {
                return print_json(&form);
            }
            let or_dash = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };
            println!("Medical Profile");
            println!("===============");
            println!("  Full name:          {}", or_dash(&form.full_name));
            println!(
                "  Blood type:         {}",
                form.blood_type.map_or("-", |bt| bt.as_str())
            );
            println!(
                "  Diabetes:           {}",
                if form.has_diabetes { "yes" } else { "no" }
            );
            println!("  Allergies:          {}", or_dash(&form.allergies));
            println!("  Medical conditions: {}", or_dash(&form.medical_conditions));
            println!("  Medications:        {}", or_dash(&form.medications));
            println!("  Emergency notes:    {}", or_dash(&form.emergency_notes));
        }
        ProfileCommand::Edit(edit) => {
            let mut form = editor.load_profile_form()?;
            edit.apply_to(&mut form);
            editor.save_profile(&form)?;
            println!("Profile saved.");
        }
    }
    Ok(())
}

fn handle_contacts(editor: &Editor<'_>, cmd: ContactsCommand) -> anyhow::Result<()> {
    match cmd {
        ContactsCommand::List(args) => {
            let contacts = editor.list_contacts()?;
            if args.json {
                return print_json(&contacts);
            }
            if contacts.is_empty() {
                println!("No contacts added yet");
            }
            for contact in &contacts {
                println!(
                    "{}  {:<9}{} ({}) {}",
                    contact.id,
                    if contact.is_primary { "[Primary]" } else { "" },
                    contact.name,
                    contact.relationship,
                    contact.phone
                );
            }
        }
        ContactsCommand::Add {
            name,
            relationship,
            phone,
            primary,
        } => {
            let contact = editor.add_contact(&ContactForm::new(name, relationship, phone, primary))?;
            println!("{}", contact.id);
        }
        ContactsCommand::Edit(edit) => {
            let id = edit.id;
            let mut form = editor.load_contact_form(id)?;
            edit.apply_to(&mut form);
            editor.update_contact(id, &form)?;
            println!("Contact updated.");
        }
        ContactsCommand::Remove { id } => {
            editor.remove_contact(id)?;
            println!("Contact removed.");
        }
    }
    Ok(())
}

fn handle_status(
    config: &Config,
    storage: &Storage,
    session: &Session,
    json: bool,
) -> anyhow::Result<()> {
    let stats = storage.stats()?;
    let user = session.current_user_id();

    if json {
        let status = serde_json::json!({
            "database_path": config.database_path(),
            "signed_in_user": user,
            "stats": stats,
        });
        return print_json(&status);
    }

    println!("lifeline status");
    println!("---------------");
    println!("Database:      {}", config.database_path().display());
    match user {
        Some(user) => println!("Signed in as:  {user}"),
        None => println!("Signed in as:  (nobody)"),
    }
    println!("Users:         {}", stats.users);
    println!("Contacts:      {}", stats.contacts);
    println!("Database size: {} bytes", stats.db_size_bytes);
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                return print_json(config);
            }
            println!("Current Configuration");
            println!("=====================");
            println!();
            println!("[Storage]");
            println!("  Database path:      {}", config.database_path().display());
            println!("  Busy timeout (ms):  {}", config.storage.busy_timeout_ms);
            println!();
            println!("[Contacts]");
            println!("  Single primary:     {}", config.contacts.single_primary);
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path.clone()))
                .with_context(|| format!("invalid configuration: {}", path.display()))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
