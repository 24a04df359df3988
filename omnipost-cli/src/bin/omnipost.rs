use omnipost_cli::*;

use anyhow::{anyhow, Context};
use colored_json::to_colored_json_auto;
use log::{self, debug, info, warn};
use omnipost::auth::token_claims;
use omnipost::composer::{available_platforms, PostDraft};
use omnipost::models::*;
use omnipost::oauth::CallbackOutcome;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use structopt::StructOpt;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

#[derive(StructOpt)]
#[structopt(
    rename_all = "kebab-case",
    about = "CLI client for the omnipost social-media management service"
)]
struct Opt {
    /// Base URL of the backend API
    #[structopt(
        global = true,
        long = "api-url",
        env = "OMNIPOST_API_URL",
        default_value = "http://localhost:8000/api"
    )]
    api_url: String,

    /// JSON file holding the session credentials (access and refresh token)
    #[structopt(
        global = true,
        long = "credentials",
        env = "OMNIPOST_CREDENTIALS",
        parse(from_os_str),
        default_value = "omnipost_credentials.json"
    )]
    credentials: PathBuf,

    /// Print raw JSON responses instead of formatted output
    #[structopt(global = true, long)]
    json: bool,

    /// Log more messages. Pass multiple times for ever more verbosity
    ///
    /// By default, it'll only report errors. Passing `-v` one time also prints
    /// warnings, `-vv` enables info logging, `-vvv` debug, and `-vvvv` trace.
    #[structopt(global = true, long, short = "v", parse(from_occurrences))]
    verbose: i8,

    #[structopt(long = "shell-completions", hidden = true)]
    shell_completions: Option<structopt::clap::Shell>,

    #[structopt(subcommand)]
    cmd: Option<Command>,
}

#[derive(StructOpt)]
enum AccountCommand {
    /// Register a new user and start a session
    Register {
        #[structopt(long, short)]
        email: String,

        #[structopt(long, short)]
        username: String,

        #[structopt(long, short = "n")]
        full_name: String,

        #[structopt(long, short, env = "OMNIPOST_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Start a session; credentials are saved for later commands
    Login {
        #[structopt(long, short)]
        email: String,

        #[structopt(long, short, env = "OMNIPOST_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the session; local credentials are removed even if the server can't be reached
    Logout,
    /// Show the logged-in user
    Info,
}

#[derive(StructOpt)]
enum AccountsCommand {
    /// List connected social-media accounts
    List,
    /// Start linking a platform account; prints the authorization URL to visit
    Connect { platform: Platform },
    Disconnect { id: ResourceId },
    /// Finish linking after the platform redirected back
    Callback {
        platform: Platform,

        /// Full redirect URL (alternative to --code/--state)
        #[structopt(long)]
        url: Option<String>,

        #[structopt(long)]
        code: Option<String>,

        #[structopt(long)]
        state: Option<String>,
    },
}

#[derive(StructOpt)]
enum PostsCommand {
    List {
        #[structopt(long, default_value = "1")]
        page: u32,
        #[structopt(long, default_value = "20")]
        limit: u32,
    },
    /// Compose and publish (or schedule) a post across platforms
    Create {
        text: String,

        /// Target platform; repeat for several
        #[structopt(long = "platform", short = "p", number_of_values = 1)]
        platforms: Vec<Platform>,

        /// Local file to upload and attach; repeat for several
        #[structopt(long = "media", number_of_values = 1, parse(from_os_str))]
        media: Vec<PathBuf>,

        /// Already-uploaded media URL to attach; repeat for several
        #[structopt(long = "media-url", number_of_values = 1)]
        media_urls: Vec<String>,

        /// RFC 3339 timestamp, eg 2024-05-01T09:00:00Z
        #[structopt(long)]
        schedule: Option<String>,
    },
    /// Upload a media file and print its URL
    Upload {
        #[structopt(parse(from_os_str))]
        path: PathBuf,
    },
    Schedule {
        id: ResourceId,
        /// RFC 3339 timestamp, eg 2024-05-01T09:00:00Z
        when: String,
    },
    Delete {
        id: ResourceId,
    },
    Metrics {
        id: ResourceId,
    },
}

#[derive(StructOpt)]
enum NotificationsCommand {
    List {
        #[structopt(long, default_value = "1")]
        page: u32,
        #[structopt(long, default_value = "50")]
        limit: u32,
        /// Only show unread notifications
        #[structopt(long)]
        unread: bool,
    },
    Read {
        id: ResourceId,
    },
    ReadAll,
}

#[derive(StructOpt)]
enum Command {
    /// Summarize configuration and session state
    Status {
        /// Also check the session against the API
        #[structopt(long)]
        check: bool,
    },

    /// Sub-commands for the user session
    Account {
        #[structopt(subcommand)]
        cmd: AccountCommand,
    },

    /// Sub-commands for connected social-media accounts
    Accounts {
        #[structopt(subcommand)]
        cmd: AccountsCommand,
    },

    /// Unified feed across connected platforms
    Feed {
        #[structopt(long, default_value = "1")]
        page: u32,
        #[structopt(long, default_value = "10")]
        limit: u32,
        /// Keep fetching following pages, up to this many in total
        #[structopt(long, default_value = "1")]
        pages: u32,
    },

    Posts {
        #[structopt(subcommand)]
        cmd: PostsCommand,
    },

    /// Per-platform audience and engagement stats
    Analytics,

    Notifications {
        #[structopt(subcommand)]
        cmd: NotificationsCommand,
    },

    /// Arbitrary API call; fields are `key=value` (JSON body) or `key==value` (query)
    Request {
        method: Method,
        path: String,
        fields: Vec<ArgField>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let opt = Opt::from_args();

    let log_level = match opt.verbose {
        std::i8::MIN..=-1 => "none",
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        4..=std::i8::MAX => "trace",
    };
    // hyper logging is very verbose, so crank that down even if everything else is more verbose
    let log_filter = format!("{},hyper=error,reqwest=error", log_level);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter))
        .format_timestamp(None)
        .init();

    debug!("Args parsed, starting up");

    #[cfg(windows)]
    colored_json::enable_ansi_support();

    if let Some(shell) = opt.shell_completions {
        Opt::clap().gen_completions_to("omnipost", shell, &mut std::io::stdout());
        std::process::exit(0);
    }

    if let Err(err) = run(opt) {
        // Be graceful about some errors
        if let Some(io_err) = err.root_cause().downcast_ref::<std::io::Error>() {
            if let std::io::ErrorKind::BrokenPipe = io_err.kind() {
                // presumably due to something like writing to stdout and piped to `head -n10` and
                // stdout was closed
                debug!("got BrokenPipe error, assuming stdout closed as expected and exiting with success");
                std::process::exit(0);
            }
        }
        let mut color_stderr = StandardStream::stderr(if atty::is(atty::Stream::Stderr) {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        });
        color_stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        eprintln!("Error: {:?}", err);
        color_stderr.set_color(&ColorSpec::new())?;
        let expired = err
            .chain()
            .filter_map(|e| e.downcast_ref::<ApiError>())
            .any(|e| matches!(e, ApiError::SessionExpired { .. } | ApiError::NotAuthenticated));
        if expired {
            eprintln!("Hint: log in again with `omnipost account login`");
        }
        std::process::exit(1);
    }
    Ok(())
}

fn print_json<T: Serialize>(val: &T) -> Result<()> {
    let val = serde_json::to_value(val)?;
    writeln!(&mut std::io::stdout(), "{}", to_colored_json_auto(&val)?)?;
    Ok(())
}

/// Either dumps `val` as JSON or hands it to a pretty-printer
fn output<T, F>(json: bool, val: &T, pp: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> Result<()>,
{
    if json {
        print_json(val)
    } else {
        pp(val)
    }
}

fn print_status(opt: &Opt, session: &Session) -> Result<()> {
    println!("Configuration");
    println!("  OMNIPOST_API_URL: {}", opt.api_url);
    println!("  OMNIPOST_CREDENTIALS: {}", opt.credentials.display());
    println!("Session");
    match session.access_token()? {
        Some(token) => {
            println!("  access token: <stored>");
            match token_claims(&token) {
                Ok(claims) => {
                    if let Some(sub) = &claims.subject {
                        println!("  subject: {}", sub);
                    }
                    if let Some(exp) = claims.expires_at {
                        let state = if claims.is_expired_now() {
                            "expired, will refresh on next call"
                        } else {
                            "valid"
                        };
                        println!("  expires: {} ({})", exp, state);
                    }
                }
                Err(_) => println!("  (opaque token)"),
            }
        }
        None => println!("  access token:"),
    }
    if session.refresh_token()?.is_some() {
        println!("  refresh token: <stored>");
    } else {
        println!("  refresh token:");
    }
    Ok(())
}

fn run(opt: Opt) -> Result<()> {
    let cmd = match opt.cmd {
        Some(ref cmd) => cmd,
        None => {
            Opt::clap().print_help()?;
            println!();
            return Ok(());
        }
    };
    let session = Session::new(FileStore::new(&opt.credentials)).with_expiry_hook(|| {
        warn!("session expired; stored credentials were cleared");
    });
    let client = ApiClient::new(&opt.api_url, session)
        .with_context(|| format!("setting up API client for {}", opt.api_url))?;
    let json = opt.json;

    match cmd {
        Command::Status { check } => {
            print_status(&opt, client.session())?;
            if *check {
                let user = client.current_user().context("checking session")?;
                println!("  logged in as: @{} ({})", user.username, user.email);
            }
        }
        Command::Account {
            cmd:
                AccountCommand::Register {
                    email,
                    username,
                    full_name,
                    password,
                },
        } => {
            let user = client
                .register(&RegisterData {
                    email: email.clone(),
                    username: username.clone(),
                    fullName: full_name.clone(),
                    password: password.clone(),
                })
                .context("registering account")?;
            output(json, &user, pretty::pp_user)?;
        }
        Command::Account {
            cmd: AccountCommand::Login { email, password },
        } => {
            let user = client
                .login(&LoginCredentials {
                    email: email.clone(),
                    password: password.clone(),
                })
                .context("logging in")?;
            info!("credentials saved to {}", opt.credentials.display());
            output(json, &user, pretty::pp_user)?;
        }
        Command::Account {
            cmd: AccountCommand::Logout,
        } => {
            if let Err(e) = client.logout() {
                warn!("server-side logout failed: {e}");
            }
            println!("Logged out; local credentials removed");
        }
        Command::Account {
            cmd: AccountCommand::Info,
        } => {
            let user = client.current_user()?;
            output(json, &user, pretty::pp_user)?;
        }
        Command::Accounts {
            cmd: AccountsCommand::List,
        } => {
            let accounts = client.connected_accounts()?;
            output(json, &accounts, |accounts| {
                if accounts.is_empty() {
                    println!("No accounts connected yet; try `omnipost accounts connect <platform>`");
                }
                for a in accounts.iter() {
                    pretty::pp_account(a)?;
                }
                Ok(())
            })?;
        }
        Command::Accounts {
            cmd: AccountsCommand::Connect { platform },
        } => {
            let resp = client.connect_account(*platform)?;
            output(json, &resp, |resp| {
                println!(
                    "Authorize {} by visiting:\n\n  {}\n",
                    platform.display_name(),
                    resp.authUrl
                );
                println!(
                    "then run `omnipost accounts callback {} --url <redirect URL>`",
                    platform
                );
                Ok(())
            })?;
        }
        Command::Accounts {
            cmd: AccountsCommand::Disconnect { id },
        } => {
            client.disconnect_account(id.as_str())?;
            println!("Disconnected account {id}");
        }
        Command::Accounts {
            cmd:
                AccountsCommand::Callback {
                    platform,
                    url,
                    code,
                    state,
                },
        } => {
            let (code, state) = match (url, code, state) {
                (Some(url), _, _) => match CallbackOutcome::from_url(url) {
                    CallbackOutcome::Authorized { code, state } => (code, state),
                    CallbackOutcome::Denied { error } => {
                        return Err(anyhow!("authorization was denied by {}: {}", platform, error))
                    }
                    CallbackOutcome::Invalid => {
                        return Err(anyhow!("redirect URL is missing code or state"))
                    }
                },
                (None, Some(code), Some(state)) => (code.clone(), state.clone()),
                _ => return Err(anyhow!("expected --url, or both --code and --state")),
            };
            let account = client
                .handle_oauth_callback(*platform, &code, &state)
                .context("completing account connection")?;
            output(json, &account, pretty::pp_account)?;
        }
        Command::Feed { page, limit, pages } => {
            let mut params = Some(PaginationParams::new(*page, *limit));
            let mut fetched = 0;
            while let Some(p) = params {
                if fetched >= *pages {
                    break;
                }
                let resp = client.feed(p)?;
                output(json, &resp, |resp| {
                    for item in resp.data.iter() {
                        pretty::pp_feed_item(item)?;
                    }
                    Ok(())
                })?;
                fetched += 1;
                params = resp.next_page();
            }
        }
        Command::Posts {
            cmd: PostsCommand::List { page, limit },
        } => {
            let resp = client.posts(PaginationParams::new(*page, *limit))?;
            output(json, &resp, |resp| {
                for post in resp.data.iter() {
                    pretty::pp_post(post)?;
                }
                if resp.hasMore {
                    println!("(more: --page {})", resp.page + 1);
                }
                Ok(())
            })?;
        }
        Command::Posts {
            cmd:
                PostsCommand::Create {
                    text,
                    platforms,
                    media,
                    media_urls,
                    schedule,
                },
        } => {
            let mut draft = PostDraft::new();
            draft.set_content(text);
            for p in platforms.iter() {
                draft.toggle_platform(*p);
            }
            if let Some(when) = schedule {
                draft.schedule_at(when)?;
            }
            // validate before uploading anything
            draft.to_request()?;

            let connected = available_platforms(&client.connected_accounts()?);
            for p in draft.selected_platforms() {
                if !connected.contains(p) {
                    warn!("no active {} account connected", p.display_name());
                }
            }
            for path in media.iter() {
                let file = MediaFile::from_path(path)?;
                let upload = client
                    .upload_media(file)
                    .with_context(|| format!("uploading {}", path.display()))?;
                info!("uploaded {} as {}", path.display(), upload.url);
                draft.add_media_url(&upload.url);
            }
            for url in media_urls.iter() {
                draft.add_media_url(url);
            }
            let post = client.create_post(&draft.to_request()?)?;
            output(json, &post, pretty::pp_post)?;
        }
        Command::Posts {
            cmd: PostsCommand::Upload { path },
        } => {
            let upload = client.upload_media(MediaFile::from_path(path)?)?;
            output(json, &upload, |upload| {
                println!("{}", upload.url);
                Ok(())
            })?;
        }
        Command::Posts {
            cmd: PostsCommand::Schedule { id, when },
        } => {
            omnipost::composer::parse_timestamp(when)?;
            let post = client.schedule_post(id.as_str(), when)?;
            output(json, &post, pretty::pp_post)?;
        }
        Command::Posts {
            cmd: PostsCommand::Delete { id },
        } => {
            client.delete_post(id.as_str())?;
            println!("Deleted post {id}");
        }
        Command::Posts {
            cmd: PostsCommand::Metrics { id },
        } => {
            let metrics = client.post_metrics(id.as_str())?;
            output(json, &metrics, |m| pretty::pp_post_metrics(m))?;
        }
        Command::Analytics => {
            let stats = client.platform_stats()?;
            output(json, &stats, |s| pretty::pp_platform_stats(s))?;
        }
        Command::Notifications {
            cmd: NotificationsCommand::List {
                page,
                limit,
                unread,
            },
        } => {
            let resp = client.notifications(PaginationParams::new(*page, *limit))?;
            output(json, &resp, |resp| {
                for n in resp.data.iter().filter(|n| !*unread || !n.read) {
                    pretty::pp_notification(n)?;
                }
                Ok(())
            })?;
        }
        Command::Notifications {
            cmd: NotificationsCommand::Read { id },
        } => {
            client.mark_notification_read(id.as_str())?;
        }
        Command::Notifications {
            cmd: NotificationsCommand::ReadAll,
        } => {
            client.mark_all_notifications_read()?;
        }
        Command::Request {
            method,
            path,
            fields,
        } => {
            let query = query_from_fields(fields);
            let body = body_from_fields(fields.clone());
            if let Some(val) = client.raw(*method, path, query, body)? {
                print_json(&val)?;
            }
        }
    }
    Ok(())
}
