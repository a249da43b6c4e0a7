//! Deterministic demo figures for a filter selection.
//!
//! The generator is seeded from the filter values, so the same selection
//! always yields the same snapshot and exports stay reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dashboard::data::{CompositionItem, DashboardData, Metric, Trend, TrendItem};
use crate::dashboard::filters::{Cenario, Entidade, FilterState, TipoPeriodo};
use crate::dashboard::money::{format_change, format_currency, format_percent};

const BASE_RECEITA: f64 = 2_450_000.0;

const REVENUE_SOURCES: [(&str, f64, &str); 4] = [
    ("Vendas de Produtos", 62.0, "#2563eb"),
    ("Prestação de Serviços", 24.0, "#16a34a"),
    ("Licenciamento", 9.0, "#f59e0b"),
    ("Outras Receitas", 5.0, "#9333ea"),
];

const EXPENSE_CATEGORIES: [(&str, f64, &str); 5] = [
    ("Pessoal", 46.0, "#dc2626"),
    ("Administrativas", 21.0, "#ea580c"),
    ("Comerciais", 17.0, "#ca8a04"),
    ("Tecnologia", 10.0, "#0891b2"),
    ("Outras Despesas", 6.0, "#64748b"),
];

const TREND_NAMES: [&str; 4] = [
    "Receita Recorrente",
    "Ticket Médio",
    "Custo de Aquisição",
    "Inadimplência",
];

/// FNV-1a, stable across platforms and releases.
fn seed_for(filters: &FilterState) -> u64 {
    filters
        .fingerprint()
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
            (hash ^ byte as u64).wrapping_mul(0x0100_0000_01b3)
        })
}

fn entity_factor(entidade: Entidade) -> f64 {
    match entidade {
        Entidade::Consolidado => 1.0,
        Entidade::Individual => 0.6,
        Entidade::Filial1 => 0.25,
        Entidade::Filial2 => 0.15,
    }
}

fn scenario_factor(cenario: Cenario) -> f64 {
    match cenario {
        Cenario::Real => 1.0,
        Cenario::Orcado => 1.05,
        Cenario::Forecast => 1.02,
        Cenario::Projetado => 1.08,
        Cenario::Realizado => 0.98,
    }
}

/// Number of months covered by the selection, at least one.
fn month_span(filters: &FilterState) -> f64 {
    match (
        filters.tipo_periodo(),
        filters.periodo_inicial(),
        filters.periodo_final(),
    ) {
        (TipoPeriodo::Intervalo, Some(inicio), Some(fim)) => {
            let days = (fim - inicio).num_days() as f64;
            (days / 30.4).round().max(1.0)
        }
        _ => 1.0,
    }
}

fn trend_of(change: f64) -> Trend {
    if change >= 0.0 {
        Trend::Up
    } else {
        Trend::Down
    }
}

fn breakdown(
    rng: &mut StdRng,
    parts: &[(&str, f64, &str)],
    total: f64,
    filters: &FilterState,
) -> Vec<CompositionItem> {
    let weights: Vec<f64> = parts
        .iter()
        .map(|(_, base, _)| *base * rng.gen_range(0.85..1.15_f64))
        .collect();
    let sum: f64 = weights.iter().sum();

    parts
        .iter()
        .zip(weights)
        .map(|((name, _, color), weight)| {
            let share = weight / sum * 100.0;
            CompositionItem {
                name: name.to_string(),
                value: (share * 10.0).round() / 10.0,
                color: color.to_string(),
                percentage: format_percent(share, 1),
                amount: format_currency(total * share / 100.0, filters.moeda, filters.precisao()),
            }
        })
        .collect()
}

/// Build the dashboard figures for `filters`.
pub fn generate(filters: &FilterState) -> DashboardData {
    let mut rng = StdRng::seed_from_u64(seed_for(filters));
    let precisao = filters.precisao();

    let receita = BASE_RECEITA
        * entity_factor(filters.entidade())
        * scenario_factor(filters.cenario)
        * month_span(filters)
        * rng.gen_range(0.92..1.08_f64);

    let margem_bruta = 42.0 + rng.gen_range(-2.0..2.0_f64);
    let margem_ebitda = 18.5 + rng.gen_range(-1.5..1.5_f64);
    let margem_liquida = 11.8 + rng.gen_range(-1.2..1.2_f64);
    let roe = 15.6 + rng.gen_range(-2.0..2.0_f64);

    let lucro = receita * margem_liquida / 100.0;
    let ebitda = receita * margem_ebitda / 100.0;
    let despesas = receita * (margem_bruta - margem_ebitda) / 100.0;

    let mut money_metric = |amount: f64| {
        let change = rng.gen_range(-8.0..15.0_f64);
        Metric {
            value: format_currency(amount, filters.moeda, precisao),
            change: format_change(change, 1),
            trend: trend_of(change),
        }
    };
    let receita_metric = money_metric(receita);
    let lucro_metric = money_metric(lucro);
    let ebitda_metric = money_metric(ebitda);

    let mut ratio_metric = |value: f64| {
        let change = rng.gen_range(-3.0..3.0_f64);
        Metric {
            value: format_percent(value, 1),
            change: format_change(change, 1),
            trend: trend_of(change),
        }
    };
    let margem_bruta_metric = ratio_metric(margem_bruta);
    let margem_ebitda_metric = ratio_metric(margem_ebitda);
    let margem_liquida_metric = ratio_metric(margem_liquida);
    let roe_metric = ratio_metric(roe);

    let revenue_composition = breakdown(&mut rng, &REVENUE_SOURCES, receita, filters);
    let expense_distribution = breakdown(&mut rng, &EXPENSE_CATEGORIES, despesas, filters);

    let trends = TREND_NAMES
        .iter()
        .map(|name| {
            let change = rng.gen_range(-10.0..12.0_f64);
            TrendItem {
                name: name.to_string(),
                change: format_change(change, 1),
                trend: trend_of(change),
            }
        })
        .collect();

    DashboardData {
        receita: receita_metric,
        lucro: lucro_metric,
        ebitda: ebitda_metric,
        margem_bruta: margem_bruta_metric,
        margem_ebitda: margem_ebitda_metric,
        margem_liquida: margem_liquida_metric,
        roe: roe_metric,
        revenue_composition,
        expense_distribution,
        trends,
    }
}
