//! The chat command layer.
//!
//! One entry point, [`dispatch`]: takes the raw message text, runs the
//! matching handler against the store, and returns the reply text. Replies
//! are user-facing Spanish, matching the bot's historical vocabulary.
//!
//! Handlers are synchronous and re-read the store on every call; they hold
//! no state of their own.

use crate::clock;
use crate::json_ext::JsonExt;
use crate::money::{format_currency, parse_amount};
use crate::records::{Expense, PendingPayment};
use crate::settings::{
    DEFAULT_CURRENCY, DEFAULT_TIMEZONE, SETTING_CURRENCY, SETTING_MONTHLY_BUDGET, SETTING_TIMEZONE,
};
use crate::store::Store;
use chrono::DateTime;
use chrono_tz::Tz;
use log::error;
use serde_json::json;
use std::fs;

/// Parse a message and run the matching command against the store.
pub fn dispatch(store: &Store, message: &str) -> String {
    let text = message.trim();
    if text.is_empty() {
        return "Mensaje vacío.".to_string();
    }

    let parts: Vec<&str> = text.split_whitespace().collect();
    let cmd = parts[0].to_lowercase();
    let args = &parts[1..];

    match cmd.as_str() {
        "gasto" => handle_expense(store, args),
        "hoy" => handle_today(store),
        "semana" => handle_week(store),
        "mes" => handle_month(store),
        "gastos" => match args.first().map(|s| s.to_lowercase()).as_deref() {
            None | Some("hoy") => handle_today(store),
            Some("semana") => handle_week(store),
            Some("mes") => handle_month(store),
            _ => unknown(),
        },
        "presupuesto" => handle_budget(store, args),
        "cuanto" if args.len() >= 2 && args[0] == "me" && args[1] == "queda" => {
            handle_remaining(store)
        }
        "pagopendiente" => handle_pending(store, args),
        "resumen" => handle_summary(store),
        "exportar" => handle_export(store, args),
        "ayuda" => help_text(),
        _ => unknown(),
    }
}

// ============================================================================
// Shared context
// ============================================================================

/// Settings resolved per call, with per-key defaults.
///
/// Resolution happens key by key because settings files written before a
/// default was introduced do not contain it (defaults are only seeded into
/// brand-new files).
struct Context {
    tz: Tz,
    currency: String,
    monthly_budget: i64,
}

fn context(store: &Store) -> Context {
    let settings = store.settings();
    Context {
        tz: clock::resolve_timezone(settings.get_str_or(SETTING_TIMEZONE, DEFAULT_TIMEZONE)),
        currency: settings
            .get_str_or(SETTING_CURRENCY, DEFAULT_CURRENCY)
            .to_string(),
        monthly_budget: settings.get_i64_or(SETTING_MONTHLY_BUDGET, 0),
    }
}

fn unknown() -> String {
    "❓ No entendí. Envía 'ayuda' para ver comandos.".to_string()
}

/// Sum of expenses whose localized timestamp satisfies `keep`.
fn total_where(
    expenses: &[Expense],
    tz: Tz,
    keep: impl Fn(&DateTime<Tz>) -> bool,
) -> i64 {
    expenses
        .iter()
        .filter_map(|e| e.date_in(tz).map(|d| (d, e.amount)))
        .filter(|(d, _)| keep(d))
        .map(|(_, amount)| amount)
        .sum()
}

// ============================================================================
// Expenses
// ============================================================================

fn handle_expense(store: &Store, args: &[&str]) -> String {
    let Some(amount_str) = args.first() else {
        return "❌ Formato incorrecto. Usa: gasto <monto> <detalle>".to_string();
    };
    let Some(amount) = parse_amount(amount_str) else {
        return "❌ El monto debe ser un número positivo.".to_string();
    };

    let rest = &args[1..];
    if rest.is_empty() {
        return "❌ Falta el detalle del gasto.".to_string();
    }
    let (category, detail) = if rest.len() >= 2 {
        (rest[0].to_string(), rest[1..].join(" "))
    } else {
        ("varios".to_string(), rest[0].to_string())
    };

    let ctx = context(store);
    let now = clock::now_in(ctx.tz);
    let expense = Expense::new(amount, &category, &detail, now);

    if !store.append_expense(&expense) {
        return "❌ No se pudo guardar el gasto. Intenta de nuevo.".to_string();
    }

    format!(
        "✅ Registrado: {} — {} ({}).",
        format_currency(amount, &ctx.currency),
        detail,
        now.format("%d %b %Y %H:%M")
    )
}

fn handle_today(store: &Store) -> String {
    let ctx = context(store);
    let now = clock::now_in(ctx.tz);
    let today = clock::day_key(&now);

    let expenses = store.expenses();
    let total = total_where(&expenses, ctx.tz, |d| clock::day_key(d) == today);

    if total == 0 {
        return format!("Hoy ({today}) no has gastado nada.");
    }
    format!(
        "Hoy has gastado: {}.",
        format_currency(total, &ctx.currency)
    )
}

fn handle_week(store: &Store) -> String {
    let ctx = context(store);
    let now = clock::now_in(ctx.tz);
    let week_start = clock::start_of_week(now);

    let expenses = store.expenses();
    let total = total_where(&expenses, ctx.tz, |d| *d >= week_start);

    format!(
        "Esta semana (desde {}) has gastado: {}.",
        week_start.format("%d/%m"),
        format_currency(total, &ctx.currency)
    )
}

fn handle_month(store: &Store) -> String {
    let ctx = context(store);
    let now = clock::now_in(ctx.tz);
    let month = clock::month_key(&now);

    let expenses = store.expenses();
    let total = total_where(&expenses, ctx.tz, |d| clock::month_key(d) == month);

    let mut msg = format!(
        "En {} has gastado: {}. Presupuesto: {}.",
        now.format("%B (%Y)"),
        format_currency(total, &ctx.currency),
        format_currency(ctx.monthly_budget, &ctx.currency)
    );

    if total > ctx.monthly_budget {
        msg.push_str(&format!(
            " Te has pasado {}.",
            format_currency(total - ctx.monthly_budget, &ctx.currency)
        ));
    } else {
        msg.push_str(&format!(
            " Te quedan {}.",
            format_currency(ctx.monthly_budget - total, &ctx.currency)
        ));
    }
    msg
}

// ============================================================================
// Budget
// ============================================================================

fn handle_budget(store: &Store, args: &[&str]) -> String {
    let Some(amount_str) = args.first() else {
        return "❌ Indica el monto. Ej: presupuesto 200000".to_string();
    };
    let Some(amount) = parse_amount(amount_str) else {
        return "❌ Monto inválido.".to_string();
    };

    let Some(settings) = store.update_setting(SETTING_MONTHLY_BUDGET, json!(amount)) else {
        return "❌ No se pudo guardar el presupuesto. Intenta de nuevo.".to_string();
    };

    let currency = settings.get_str_or(SETTING_CURRENCY, DEFAULT_CURRENCY);
    format!(
        "✅ Presupuesto mensual actualizado a: {}",
        format_currency(amount, currency)
    )
}

fn handle_remaining(store: &Store) -> String {
    let ctx = context(store);
    let now = clock::now_in(ctx.tz);
    let month = clock::month_key(&now);

    let expenses = store.expenses();
    let total = total_where(&expenses, ctx.tz, |d| clock::month_key(d) == month);
    let remaining = ctx.monthly_budget - total;

    if remaining < 0 {
        return format!(
            "⚠️ No te queda nada. Te has excedido en {}.",
            format_currency(remaining.abs(), &ctx.currency)
        );
    }
    format!(
        "Te quedan: {} del presupuesto de {}.",
        format_currency(remaining, &ctx.currency),
        format_currency(ctx.monthly_budget, &ctx.currency)
    )
}

// ============================================================================
// Pending payments
// ============================================================================

fn handle_pending(store: &Store, args: &[&str]) -> String {
    let Some(subcmd) = args.first().map(|s| s.to_lowercase()) else {
        return "Usa: pagopendiente agregar ... o pagopendiente listar".to_string();
    };

    match subcmd.as_str() {
        "agregar" => handle_pending_add(store, args),
        "listar" => handle_pending_list(store),
        _ => "Subcomando desconocido. Usa 'agregar' o 'listar'.".to_string(),
    }
}

fn handle_pending_add(store: &Store, args: &[&str]) -> String {
    // pagopendiente agregar <nombre…> <monto> <fecha>
    if args.len() < 4 {
        return "❌ Formato: pagopendiente agregar <nombre> <monto> <YYYY-MM-DD>".to_string();
    }

    let date_str = args[args.len() - 1];
    let amount_str = args[args.len() - 2];
    let name = args[1..args.len() - 2].join(" ");

    let Some(amount) = parse_amount(amount_str) else {
        return "❌ Monto inválido.".to_string();
    };

    let ctx = context(store);
    let Some(due_date) = clock::parse_due_date(date_str, ctx.tz) else {
        return "❌ Fecha inválida.".to_string();
    };

    let payment = PendingPayment::new(&name, amount, due_date);
    if !store.append_payment(&payment) {
        return "❌ No se pudo guardar el pago. Intenta de nuevo.".to_string();
    }

    format!(
        "✅ Pago agregado: {} - {} - vence {}.",
        name,
        format_currency(amount, &ctx.currency),
        payment.due_date
    )
}

fn handle_pending_list(store: &Store) -> String {
    let mut pending: Vec<PendingPayment> =
        store.payments().into_iter().filter(|p| !p.paid).collect();
    if pending.is_empty() {
        return "No tienes pagos pendientes.".to_string();
    }

    // ISO dates sort lexicographically
    pending.sort_by(|a, b| a.due_date.cmp(&b.due_date));

    let ctx = context(store);
    let mut msg = "📅 Pagos pendientes:\n".to_string();
    for p in &pending {
        msg.push_str(&format!(
            "- {}: {} ({})\n",
            p.name,
            format_currency(p.amount, &ctx.currency),
            p.due_date
        ));
    }
    msg.trim_end().to_string()
}

// ============================================================================
// Summary & export
// ============================================================================

fn handle_summary(store: &Store) -> String {
    let today_msg = handle_today(store);
    let week_msg = handle_week(store);
    let month_msg = handle_month(store);

    let mut pending: Vec<PendingPayment> =
        store.payments().into_iter().filter(|p| !p.paid).collect();
    pending.sort_by(|a, b| a.due_date.cmp(&b.due_date));

    let next_msg = match pending.first() {
        Some(next) => {
            let ctx = context(store);
            format!(
                "\nPróximo pago: {} ({}) el {}.",
                next.name,
                format_currency(next.amount, &ctx.currency),
                next.due_date
            )
        }
        None => String::new(),
    };

    format!("📊 Resumen:\n{today_msg}\n{week_msg}\n{month_msg}{next_msg}")
}

fn handle_export(store: &Store, args: &[&str]) -> String {
    if args.len() < 2 || args[0] != "mes" {
        return "❌ Formato: exportar mes YYYY-MM".to_string();
    }
    let month = args[1];
    if !clock::is_month_key(month) {
        return "❌ Formato de fecha inválido. Usa YYYY-MM (ej: 2025-11).".to_string();
    }

    let expenses: Vec<Expense> = store
        .expenses()
        .into_iter()
        .filter(|e| e.date.starts_with(month))
        .collect();
    if expenses.is_empty() {
        return format!("No hay gastos para {month}.");
    }

    let mut csv = String::from("fecha,monto,categoria,detalle,id\n");
    for e in &expenses {
        csv.push_str(&format!(
            "{},{},{},{},{}\n",
            csv_field(&e.date),
            e.amount,
            csv_field(&e.category),
            csv_field(&e.detail),
            csv_field(&e.id)
        ));
    }

    let path = store.data_dir().join(format!("export_{month}.csv"));
    if let Err(e) = fs::write(&path, csv) {
        error!("could not write export {}: {}", path.display(), e);
        return "❌ No se pudo escribir el archivo de exportación.".to_string();
    }

    format!("✅ Archivo exportado: {}", path.display())
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn help_text() -> String {
    "🤖 Comandos disponibles:

- *gasto <monto> <detalle>*: Registrar gasto.
- *gasto <monto> <cat> <detalle>*: Registrar con categoría.
- *hoy* / *gastos hoy*: Resumen diario.
- *semana*: Resumen semanal.
- *mes*: Resumen mensual y estado del presupuesto.
- *presupuesto <monto>*: Definir presupuesto mensual.
- *cuanto me queda*: Ver saldo restante.
- *pagopendiente agregar <nombre> <monto> <fecha>*: Agendar pago.
- *pagopendiente listar*: Ver pagos pendientes.
- *resumen*: Reporte general.
- *exportar mes <YYYY-MM>*: Exportar a CSV.
"
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================
