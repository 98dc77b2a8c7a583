//! Site inputs through both pressure servers for a small flat-roofed building.

use approx::assert_relative_eq;
use wind_core::catalog::Catalog;
use wind_core::units::{Feet, Mph, Psf, SqFt};
use wind_core::wind::candc::{CandCServer, LoadQuery};
use wind_core::wind::config::WindOptions;
use wind_core::wind::inputs::{calc_wind_server_inputs, SiteInputs, WindInputs};
use wind_core::wind::mwfrs::MainWindServer;
use wind_core::wind::{Axis, BuildingType, Element, Exposure, GustMethod};
use wind_core::{Equation, ErrorKind};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn shop() -> WindInputs {
    let site = SiteInputs::new(
        Mph(115.0),
        Exposure::C,
        BuildingType::LowRise,
        Feet(60.0),
        Feet(40.0),
        Feet(15.0),
    )
    .with_parapet(Feet(17.0));
    calc_wind_server_inputs(&site, Catalog::shared().unwrap()).unwrap()
}

#[test]
fn test_shop_inputs() {
    init_logging();
    let inputs = shop();

    assert!(inputs.q_h.0 > 0.0 && inputs.q_h.0.is_finite());
    assert!(inputs.q_p.unwrap() > inputs.q_h);
    assert!(inputs.g_x > 0.0 && inputs.g_x < 1.0);
    assert!(inputs.g_y > 0.0 && inputs.g_y < 1.0);
    // min(6, 4, 6) = 4 ft, above the 3 ft floor
    assert_relative_eq!(inputs.a.0, 4.0, epsilon = 1e-12);
}

#[test]
fn test_shop_mwfrs() {
    init_logging();
    let inputs = shop();
    let server = MainWindServer::from_inputs(&inputs, Catalog::shared().unwrap()).unwrap();

    for axis in Axis::ALL {
        let leeward = server.get_load(axis, Element::Wall, "leeward").unwrap();
        assert!(leeward.p1.0 < 0.0);

        let windward = server.get_load(axis, Element::Wall, Feet(10.0)).unwrap();
        assert!(windward.p1.0 > 0.0);

        let roof = server.get_load(axis, Element::Roof, Feet(5.0)).unwrap();
        assert!(roof.p1.0 < 0.0);
    }

    // Parapets skip the gust factor and internal pressure
    let parapet = server.get_load(Axis::X, Element::Parapet, "windward").unwrap();
    let c_p = server
        .coefficients(Axis::X, Element::Parapet)
        .get("windward")
        .unwrap()
        .number("c1")
        .unwrap();
    assert_relative_eq!(parapet.p1.0, inputs.q_p.unwrap().0 * inputs.k_d * c_p, epsilon = 1e-9);
    assert_relative_eq!(parapet.p1.0, inputs.q_p.unwrap().0 * inputs.k_d * 1.5, epsilon = 1e-9);
    assert_relative_eq!(parapet.p2.0, inputs.q_p.unwrap().0 * inputs.k_d * 1.5, epsilon = 1e-9);

    let leeward = server.get_load(Axis::Y, Element::Parapet, "leeward").unwrap();
    assert_relative_eq!(leeward.p1.0, -inputs.q_p.unwrap().0 * inputs.k_d, epsilon = 1e-9);
    assert_relative_eq!(leeward.p2.0, -inputs.q_p.unwrap().0 * inputs.k_d, epsilon = 1e-9);

    let err = server.get_load(Axis::X, Element::Parapet, Feet(3.0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_shop_candc() {
    init_logging();
    let inputs = shop();
    let server = CandCServer::from_inputs(&inputs, Catalog::shared().unwrap()).unwrap();

    let zones: Vec<&str> = server.zones().collect();
    assert!(zones.contains(&"1_prime-"));
    assert!(zones.contains(&"5P+"));

    let corner = server.get_load("5-", SqFt(20.0), &LoadQuery::new()).unwrap();
    let field = server.get_load("4-", SqFt(20.0), &LoadQuery::new()).unwrap();
    assert!(corner < field);

    let (combined, derivation) = server
        .get_load_traced("4P-", SqFt(20.0), &LoadQuery::new().with_gust(GustMethod::X))
        .unwrap();
    assert!(combined.0.abs() >= 32.0);
    assert!(derivation.find(Equation::CandCCompositePressure).is_some());
}

#[test]
fn test_sloped_roof_needs_ridge_axis() {
    let inputs = shop();
    let mut options = WindOptions::from(&inputs);
    options.roof_type = Some("gable".to_string());
    options.roof_angle = Some(15.0);
    options.ridge_axis = None;

    let err = MainWindServer::from_options(&options, Catalog::shared().unwrap()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    // C&C roof bands depend on the angle only
    let server = CandCServer::from_options(&options, Catalog::shared().unwrap()).unwrap();
    assert!(server.get_load("3-", SqFt(10.0), &LoadQuery::new()).unwrap() < Psf(0.0));
}

#[test]
fn test_derivation_renders() {
    let inputs = shop();
    let markdown = inputs.derivation.to_markdown();
    assert!(markdown.contains("26.10.2"));
    assert!(markdown.contains("K_e"));
}
