use omnipost::display::{
    engagement_rate, format_date_time, format_number, relative_time_now, truncate_text,
};
use omnipost::models::{
    FeedItem, Notification, NotificationKind, Platform, PlatformStats, Post, PostMetrics,
    PostStatus, SocialAccount, User,
};
use anyhow::Result;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn stdout() -> StandardStream {
    StandardStream::stdout(if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    })
}

fn platform_color(platform: Platform) -> Color {
    match platform {
        Platform::Twitter => Color::Cyan,
        Platform::Facebook => Color::Blue,
        Platform::Instagram => Color::Magenta,
        Platform::Linkedin => Color::Blue,
        Platform::Tiktok => Color::White,
    }
}

fn when(ts: &str) -> String {
    relative_time_now(ts).unwrap_or_else(|| ts.to_string())
}

fn write_platform_tag(out: &mut StandardStream, platform: Platform) -> Result<()> {
    out.set_color(
        ColorSpec::new()
            .set_fg(Some(platform_color(platform)))
            .set_bold(true),
    )?;
    write!(out, "[{}]", platform.display_name())?;
    out.reset()?;
    Ok(())
}

pub fn pp_user(user: &User) -> Result<()> {
    let mut stdout = stdout();
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
    write!(&mut stdout, "@{}", user.username)?;
    stdout.reset()?;
    writeln!(&mut stdout, " {} <{}>", user.fullName, user.email)?;
    stdout.set_color(ColorSpec::new().set_dimmed(true))?;
    writeln!(
        &mut stdout,
        "id {}, member since {}",
        user.id,
        format_date_time(&user.createdAt)
    )?;
    stdout.reset()?;
    Ok(())
}

pub fn pp_feed_item(item: &FeedItem) -> Result<()> {
    let mut stdout = stdout();

    write_platform_tag(&mut stdout, item.platform)?;
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
    write!(&mut stdout, " {}", item.authorName)?;
    stdout.reset()?;
    stdout.set_color(ColorSpec::new().set_dimmed(true))?;
    writeln!(&mut stdout, " @{} · {}", item.authorUsername, when(&item.publishedAt))?;
    stdout.reset()?;

    if !item.content.is_empty() {
        writeln!(&mut stdout, "{}", item.content)?;
    }
    if let Some(urls) = &item.mediaUrls {
        for url in urls {
            stdout.set_color(
                ColorSpec::new()
                    .set_fg(Some(Color::Green))
                    .set_dimmed(true)
                    .set_underline(true),
            )?;
            writeln!(&mut stdout, " {url}")?;
            stdout.reset()?;
        }
    }

    stdout.set_color(ColorSpec::new().set_dimmed(true))?;
    writeln!(
        &mut stdout,
        "♥ {}  💬 {}  ↻ {}",
        format_number(item.likes),
        format_number(item.comments),
        format_number(item.shares)
    )?;
    writeln!(&mut stdout, "{}\n", item.url)?;
    stdout.reset()?;
    Ok(())
}

pub fn pp_post(post: &Post) -> Result<()> {
    let mut stdout = stdout();

    let status_color = match post.status {
        PostStatus::Draft => Color::White,
        PostStatus::Scheduled => Color::Cyan,
        PostStatus::Published => Color::Green,
        PostStatus::Failed => Color::Red,
    };
    stdout.set_color(ColorSpec::new().set_fg(Some(status_color)).set_bold(true))?;
    write!(&mut stdout, "{:<10}", post.status.to_string())?;
    stdout.reset()?;
    for platform in &post.platforms {
        write_platform_tag(&mut stdout, *platform)?;
        write!(&mut stdout, " ")?;
    }
    writeln!(&mut stdout)?;

    writeln!(&mut stdout, "{}", truncate_text(&post.content, 280))?;
    if let Some(urls) = &post.mediaUrls {
        for url in urls {
            stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_underline(true))?;
            writeln!(&mut stdout, " {url}")?;
            stdout.reset()?;
        }
    }

    stdout.set_color(ColorSpec::new().set_dimmed(true))?;
    match (&post.publishedAt, &post.scheduledFor) {
        (Some(published), _) => writeln!(&mut stdout, "published {}", when(published))?,
        (None, Some(scheduled)) => writeln!(
            &mut stdout,
            "scheduled for {} ({})",
            format_date_time(scheduled),
            when(scheduled)
        )?,
        (None, None) => writeln!(&mut stdout, "created {}", when(&post.createdAt))?,
    }
    writeln!(&mut stdout, "{}\n", post.id)?;
    stdout.reset()?;
    Ok(())
}

pub fn pp_account(account: &SocialAccount) -> Result<()> {
    let mut stdout = stdout();

    write_platform_tag(&mut stdout, account.platform)?;
    stdout.set_color(ColorSpec::new().set_bold(true))?;
    write!(&mut stdout, " {} ", account.displayName)?;
    stdout.reset()?;
    write!(&mut stdout, "@{}", account.username)?;
    if !account.isActive {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
        write!(&mut stdout, " (inactive)")?;
        stdout.reset()?;
    }
    writeln!(&mut stdout)?;
    stdout.set_color(ColorSpec::new().set_dimmed(true))?;
    writeln!(
        &mut stdout,
        "{}  connected {}",
        account.id,
        format_date_time(&account.connectedAt)
    )?;
    if !account.permissions.is_empty() {
        writeln!(&mut stdout, "permissions: {}", account.permissions.join(", "))?;
    }
    writeln!(&mut stdout)?;
    stdout.reset()?;
    Ok(())
}

pub fn pp_notification(n: &Notification) -> Result<()> {
    let mut stdout = stdout();

    let color = match n.kind {
        NotificationKind::Info => Color::Blue,
        NotificationKind::Success => Color::Green,
        NotificationKind::Warning => Color::Yellow,
        NotificationKind::Error => Color::Red,
    };
    stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(!n.read))?;
    write!(&mut stdout, "{} {}", if n.read { " " } else { "●" }, n.title)?;
    stdout.reset()?;
    stdout.set_color(ColorSpec::new().set_dimmed(true))?;
    writeln!(&mut stdout, "  {}", when(&n.createdAt))?;
    stdout.reset()?;
    writeln!(&mut stdout, "  {}", n.message)?;
    stdout.set_color(ColorSpec::new().set_dimmed(true))?;
    if let Some(url) = &n.actionUrl {
        writeln!(&mut stdout, "  {url}")?;
    }
    writeln!(&mut stdout, "  {}\n", n.id)?;
    stdout.reset()?;
    Ok(())
}

pub fn pp_platform_stats(stats: &[PlatformStats]) -> Result<()> {
    let mut stdout = stdout();

    stdout.set_color(ColorSpec::new().set_bold(true))?;
    writeln!(
        &mut stdout,
        "{:<14} {:>10} {:>8} {:>12} {:>9}",
        "platform", "followers", "posts", "engagement", "avg rate"
    )?;
    stdout.reset()?;
    for s in stats {
        stdout.set_color(ColorSpec::new().set_fg(Some(platform_color(s.platform))))?;
        write!(&mut stdout, "{:<14}", s.platform.display_name())?;
        stdout.reset()?;
        writeln!(
            &mut stdout,
            " {:>10} {:>8} {:>12} {:>8.2}%",
            format_number(s.followers),
            format_number(s.totalPosts),
            format_number(s.totalEngagement),
            s.avgEngagementRate
        )?;
    }
    Ok(())
}

pub fn pp_post_metrics(metrics: &[PostMetrics]) -> Result<()> {
    let mut stdout = stdout();

    stdout.set_color(ColorSpec::new().set_bold(true))?;
    writeln!(
        &mut stdout,
        "{:<14} {:>8} {:>8} {:>8} {:>11} {:>8}",
        "platform", "likes", "comments", "shares", "impressions", "rate"
    )?;
    stdout.reset()?;
    for m in metrics {
        stdout.set_color(ColorSpec::new().set_fg(Some(platform_color(m.platform))))?;
        write!(&mut stdout, "{:<14}", m.platform.display_name())?;
        stdout.reset()?;
        writeln!(
            &mut stdout,
            " {:>8} {:>8} {:>8} {:>11} {:>7.2}%",
            format_number(m.likes),
            format_number(m.comments),
            format_number(m.shares),
            format_number(m.impressions),
            engagement_rate(m.likes, m.comments, m.shares, m.impressions)
        )?;
    }
    Ok(())
}
