use chrono::NaiveDate;

use dre_reports::dashboard::money::{
    format_change, format_currency, format_number, parse_currency, parse_percent,
};
use dre_reports::dashboard::{
    load_snapshot, sample, Comparacao, Entidade, FilterState, Moeda, Periodo, TipoPeriodo,
};
use dre_reports::ReportError;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn december() -> FilterState {
    FilterState::for_month(Periodo::new(12, 2024).unwrap())
}

#[test]
fn test_range_clears_month() {
    let mut filters = december();
    filters.set_intervalo(date(2024, 1, 1), date(2024, 6, 30)).unwrap();

    assert_eq!(filters.tipo_periodo(), TipoPeriodo::Intervalo);
    assert_eq!(filters.periodo(), None);
    assert_eq!(filters.periodo_label(), "01/01/2024 a 30/06/2024");
    filters.validate().unwrap();
}

#[test]
fn test_month_clears_range() {
    let mut filters = december();
    filters.set_intervalo(date(2024, 1, 1), date(2024, 6, 30)).unwrap();
    filters.set_periodo(Periodo::new(3, 2024).unwrap());

    assert_eq!(filters.tipo_periodo(), TipoPeriodo::Mes);
    assert_eq!(filters.periodo_inicial(), None);
    assert_eq!(filters.periodo_final(), None);
    assert_eq!(filters.periodo_label(), "Março/2024");
    filters.validate().unwrap();
}

#[test]
fn test_invalid_ranges_are_rejected_without_change() {
    let mut filters = december();

    let reversed = filters.set_intervalo(date(2024, 6, 30), date(2024, 1, 1));
    assert!(matches!(reversed, Err(ReportError::InvalidDateRange(_))));

    let same_day = filters.set_intervalo(date(2024, 1, 1), date(2024, 1, 1));
    assert!(matches!(same_day, Err(ReportError::InvalidDateRange(_))));

    let too_long = filters.set_intervalo(date(2023, 1, 1), date(2024, 1, 2));
    assert!(matches!(too_long, Err(ReportError::InvalidDateRange(_))));

    assert_eq!(filters, december());

    // exactly 365 days is allowed
    filters.set_intervalo(date(2023, 1, 1), date(2024, 1, 1)).unwrap();
}

#[test]
fn test_comparison_resets_when_mode_changes() {
    let mut filters = december();
    assert_eq!(filters.comparacao(), Comparacao::MesAnterior);

    filters.set_intervalo(date(2024, 1, 1), date(2024, 3, 31)).unwrap();
    assert_eq!(filters.comparacao(), Comparacao::PeriodoAnterior);

    filters.set_periodo(Periodo::new(4, 2024).unwrap());
    assert_eq!(filters.comparacao(), Comparacao::MesAnterior);

    // valid in both modes, so it survives the switch
    filters.set_comparacao(Comparacao::AnoAnterior).unwrap();
    filters.set_intervalo(date(2024, 1, 1), date(2024, 3, 31)).unwrap();
    assert_eq!(filters.comparacao(), Comparacao::AnoAnterior);
}

#[test]
fn test_comparison_must_suit_period_mode() {
    let mut filters = december();
    assert!(filters.set_comparacao(Comparacao::PeriodoAnterior).is_err());
    assert!(filters.set_comparacao(Comparacao::Forecast).is_ok());

    filters.set_intervalo(date(2024, 1, 1), date(2024, 3, 31)).unwrap();
    assert!(filters.set_comparacao(Comparacao::MesAnterior).is_err());
    assert!(filters.set_comparacao(Comparacao::Orcado).is_ok());
}

#[test]
fn test_cost_center_rules() {
    let mut filters = december();
    assert!(matches!(
        filters.set_centro_custo(Some("CC-100".to_string())),
        Err(ReportError::CostCenterUnavailable)
    ));

    filters.set_entidade(Entidade::Filial1);
    filters.set_centro_custo(Some("CC-100".to_string())).unwrap();
    assert_eq!(filters.centro_custo(), Some("CC-100"));

    filters.set_entidade(Entidade::Consolidado);
    assert_eq!(filters.centro_custo(), None);
}

#[test]
fn test_precision_bounds() {
    let mut filters = december();
    filters.set_precisao(4).unwrap();
    assert!(filters.set_precisao(5).is_err());
    assert_eq!(filters.precisao(), 4);

    // values read from JSON bypass the setter, so validate() catches them
    let mut json = serde_json::to_value(&filters).unwrap();
    json["precisao"] = serde_json::json!(9);
    let loaded: FilterState = serde_json::from_value(json).unwrap();
    assert!(matches!(loaded.validate(), Err(ReportError::InvalidFilter(_))));
}

#[test]
fn test_period_parsing() {
    let periodo: Periodo = "dezembro-2024".parse().unwrap();
    assert_eq!((periodo.month(), periodo.year()), (12, 2024));
    assert_eq!(periodo.to_string(), "dezembro-2024");
    assert_eq!(periodo.label(), "Dezembro/2024");

    let marco: Periodo = "marco-2024".parse().unwrap();
    assert_eq!(marco.month(), 3);

    assert!(matches!(
        "13-2024".parse::<Periodo>(),
        Err(ReportError::InvalidPeriod(_))
    ));
    assert!("dezembro".parse::<Periodo>().is_err());
}

#[test]
fn test_filter_state_json_uses_dashboard_names() {
    let mut filters = december();
    filters.set_entidade(Entidade::Filial2);
    let json = serde_json::to_value(&filters).unwrap();

    assert_eq!(json["entidade"], "filial-2");
    assert_eq!(json["periodo"], "dezembro-2024");
    assert_eq!(json["tipoPeriodo"], "mes");

    let back: FilterState = serde_json::from_value(json).unwrap();
    assert_eq!(back, filters);
}

#[test]
fn test_money_formatting() {
    assert_eq!(format_currency(2_450_000.0, Moeda::Brl, 2), "R$ 2.450.000,00");
    assert_eq!(format_currency(-5.0, Moeda::Brl, 2), "-R$ 5,00");
    assert_eq!(format_currency(1234.6, Moeda::Usd, 0), "US$ 1.235");
    assert_eq!(format_number(-0.001, 2), "0,00");
    assert_eq!(format_change(12.5, 1), "+12,5%");
    assert_eq!(format_change(-3.0, 1), "-3,0%");
}

#[test]
fn test_money_parsing() {
    assert_eq!(parse_currency("R$ 2.450.000,00"), Some(2_450_000.0));
    assert_eq!(parse_currency("-R$ 5,00"), Some(-5.0));
    assert_eq!(parse_currency("R$ -5,00"), Some(-5.0));
    assert_eq!(parse_currency("US$ -1.234,50"), Some(-1234.5));
    assert_eq!(parse_currency("-"), None);
    assert_eq!(parse_percent("+12,5%"), Some(12.5));
    assert_eq!(parse_percent("-3,0%"), Some(-3.0));
    assert_eq!(parse_percent("n/d"), None);
}

#[test]
fn test_sample_data_is_deterministic_per_filters() {
    let filters = december();
    assert_eq!(sample::generate(&filters), sample::generate(&filters));

    let mut other = december();
    other.set_entidade(Entidade::Filial1);
    assert_ne!(sample::generate(&filters), sample::generate(&other));
}

#[test]
fn test_sample_figures_are_consistent() {
    let data = sample::generate(&december());

    let receita = parse_currency(&data.receita.value).unwrap();
    let lucro = parse_currency(&data.lucro.value).unwrap();
    let margem = parse_percent(&data.margem_liquida.value).unwrap();
    assert!(((lucro / receita * 100.0) - margem).abs() <= 0.1);

    let revenue_share: f64 = data.revenue_composition.iter().map(|i| i.value).sum();
    assert!((revenue_share - 100.0).abs() <= 0.5);
}

#[test]
fn test_load_snapshot_reports_parse_errors() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("snapshot.json");

    std::fs::write(&path, serde_json::to_string(&sample::generate(&december())).unwrap()).unwrap();
    load_snapshot(&path).unwrap();

    std::fs::write(&path, "{ \"receita\": 1 }").unwrap();
    assert!(matches!(
        load_snapshot(&path),
        Err(ReportError::SnapshotParse { .. })
    ));
}
