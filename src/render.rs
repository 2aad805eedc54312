//! Telegram MarkdownV2 rendering of quotes and digests.
//!
//! Everything here is pure: identical inputs produce identical bytes.

use rust_decimal::Decimal;

use crate::core::utils::{escape_markdown_v2, format_amount, format_compact, format_percent};
use crate::market::{Money, NormalizedQuote, Resolution};
use crate::narrative::NarrativeText;

/// Direction of a 24h move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    pub fn of(change_percent: Decimal) -> Self {
        if change_percent > Decimal::ZERO {
            Self::Up
        } else if change_percent < Decimal::ZERO {
            Self::Down
        } else {
            Self::Flat
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Up => "📈",
            Self::Down => "📉",
            Self::Flat => "➖",
        }
    }
}

fn money(value: &Money) -> String {
    format!("{}{}", value.currency.symbol(), format_amount(value.amount))
}

fn header(quote: &NormalizedQuote) -> String {
    let name = escape_markdown_v2(&quote.display_name);
    let symbol = quote.instrument.symbol();
    if quote.display_name == symbol {
        format!("*{}*", name)
    } else {
        format!("*{}* \\({}\\)", name, escape_markdown_v2(symbol))
    }
}

/// Renders one quote with an optional narrative paragraph.
pub fn render(quote: &NormalizedQuote, narrative: Option<&NarrativeText>) -> String {
    let mut lines = vec![header(quote), String::new()];

    lines.push(format!("💵 {}", escape_markdown_v2(&money(&quote.price))));
    for alt in &quote.alt_prices {
        lines.push(format!("💱 {}", escape_markdown_v2(&money(alt))));
    }

    let direction = Direction::of(quote.change_percent_24h);
    lines.push(format!(
        "{} 24h: {}",
        direction.emoji(),
        escape_markdown_v2(&format_percent(quote.change_percent_24h))
    ));

    if let Some(cap) = &quote.market_cap {
        lines.push(format!(
            "🏦 Market cap: {}",
            escape_markdown_v2(&format!("{}{}", cap.currency.symbol(), format_compact(cap.amount)))
        ));
    }

    if let Some(narrative) = narrative {
        lines.push(String::new());
        lines.push(escape_markdown_v2(&narrative.text));
    }

    lines.join("\n")
}

/// [`render`] plus a notice when the quote did not come from a live provider.
pub fn render_resolution(resolution: &Resolution, narrative: Option<&NarrativeText>) -> String {
    let mut text = render(resolution.quote(), narrative);
    match resolution {
        Resolution::Live(_) => {}
        Resolution::Fallback(_) => {
            text.push_str("\n\n");
            text.push_str(&escape_markdown_v2(
                "⚠️ Live data is unavailable right now, showing reference values.",
            ));
        }
        Resolution::Placeholder(_) => {
            text.push_str("\n\n");
            text.push_str(&escape_markdown_v2(
                "⚠️ No data found for this symbol, the values shown are placeholders.",
            ));
        }
    }
    text
}

/// Compact one-line-per-instrument digest.
pub fn render_digest(quotes: &[NormalizedQuote]) -> String {
    let mut lines = vec!["📊 *Market digest*".to_string(), String::new()];

    if quotes.is_empty() {
        lines.push(escape_markdown_v2("No instruments configured."));
        return lines.join("\n");
    }

    for quote in quotes {
        let direction = Direction::of(quote.change_percent_24h);
        lines.push(format!(
            "{} *{}*: {} \\({}\\)",
            direction.emoji(),
            escape_markdown_v2(&quote.display_name),
            escape_markdown_v2(&money(&quote.price)),
            escape_markdown_v2(&format_percent(quote.change_percent_24h)),
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::InstrumentId;
    use crate::narrative::NarrativeSource;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn bitcoin() -> NormalizedQuote {
        NormalizedQuote::new(InstrumentId::crypto("bitcoin").unwrap(), "Bitcoin", dec!(64500))
            .with_change(dec!(2.5))
            .with_alt_price(Money::eur(dec!(59400.25)))
            .with_market_cap(Money::usd(dec!(1270000000000)))
    }

    #[test]
    fn test_direction_boundaries() {
        assert_eq!(Direction::of(dec!(-0.001)), Direction::Down);
        assert_eq!(Direction::of(Decimal::ZERO), Direction::Flat);
        assert_eq!(Direction::of(dec!(0.001)), Direction::Up);
    }

    #[test]
    fn test_render_full_quote() {
        let text = render(&bitcoin(), None);
        assert_eq!(
            text,
            "*Bitcoin* \\(bitcoin\\)\n\n💵 $64,500\\.00\n💱 €59,400\\.25\n📈 24h: \\+2\\.50%\n🏦 Market cap: $1\\.27T"
        );
    }

    #[test]
    fn test_header_keeps_symbol_when_only_case_differs() {
        let quote = NormalizedQuote::new(InstrumentId::crypto("solana").unwrap(), "Solana", dec!(150));
        assert!(render(&quote, None).starts_with("*Solana* \\(solana\\)\n"));
    }

    #[test]
    fn test_render_is_pure() {
        let quote = bitcoin();
        let narrative = NarrativeText {
            text: "Up (a lot).".to_string(),
            source: NarrativeSource::Template,
        };
        assert_eq!(render(&quote, Some(&narrative)), render(&quote, Some(&narrative)));
        assert!(render(&quote, Some(&narrative)).ends_with("\n\nUp \\(a lot\\)\\."));
    }

    #[test]
    fn test_render_placeholder_resolution() {
        let id = InstrumentId::crypto("doesnotexist123").unwrap();
        let resolution = Resolution::Placeholder(NormalizedQuote::placeholder(&id));
        let text = render_resolution(&resolution, None);

        assert!(text.starts_with("*doesnotexist123*\n"));
        assert!(text.contains("$100\\.00"));
        assert!(text.contains("➖ 24h: 0\\.00%"));
        assert!(text.contains("placeholders"));
    }

    #[test]
    fn test_render_live_resolution_has_no_notice() {
        let resolution = Resolution::Live(bitcoin());
        assert_eq!(render_resolution(&resolution, None), render(&bitcoin(), None));
    }

    #[test]
    fn test_render_digest() {
        let tesla = NormalizedQuote::new(InstrumentId::equity("TSLA").unwrap(), "Tesla", dec!(240)).with_change(dec!(-2.7));
        let text = render_digest(&[bitcoin(), tesla]);
        assert_eq!(
            text,
            "📊 *Market digest*\n\n📈 *Bitcoin*: $64,500\\.00 \\(\\+2\\.50%\\)\n📉 *Tesla*: $240\\.00 \\(\\-2\\.70%\\)"
        );
    }

    #[test]
    fn test_render_digest_empty() {
        assert!(render_digest(&[]).ends_with("No instruments configured\\."));
    }
}
