use backdrop::app_settings::AppSettings;
use backdrop::field::{ParticleField, Viewport};
use backdrop::palette::{FixedPalette, Palette, PaletteProvider, Rgb, ThemePalette};
use backdrop::rendering::{DrawCommand, RecordingSurface};
use backdrop::scheduler::ManualFrameDriver;
use backdrop::theme::{Theme, ThemeChange, ThemeController, ThemeSheet};
use backdrop::Backdrop;

fn mount<P: PaletteProvider>(
    palette: P,
    viewport: Viewport,
) -> Backdrop<ManualFrameDriver, RecordingSurface, P> {
    Backdrop::mount(
        Some(RecordingSurface::new()),
        ManualFrameDriver::new(),
        palette,
        ParticleField::with_seed(7),
        &AppSettings::default(),
        viewport,
    )
    .unwrap()
}

/// Fires every due frame once. Returns how many actually ran.
fn pump<P: PaletteProvider>(
    backdrop: &mut Backdrop<ManualFrameDriver, RecordingSurface, P>,
) -> usize {
    let due = backdrop.driver_mut().tick();
    due.into_iter().filter(|&h| backdrop.on_frame(h)).count()
}

#[test]
fn test_restarts_never_double_the_loop() {
    let mut backdrop = mount(FixedPalette::empty(), Viewport::new(1280.0, 720.0, 1.0));

    let mut ran = 0;
    for cycle in 0..10 {
        backdrop.start();
        backdrop.start();
        for _ in 0..5 {
            ran += pump(&mut backdrop);
        }
        if cycle % 2 == 0 {
            backdrop.stop();
            assert_eq!(pump(&mut backdrop), 0);
        }
    }

    assert_eq!(ran, 50);
    assert_eq!(backdrop.surface().frames, 50);
    assert!(backdrop.driver_mut().pending() <= 1);
}

#[test]
fn test_particles_stay_near_viewport_while_pointer_sweeps() {
    let mut backdrop = mount(FixedPalette::empty(), Viewport::new(900.0, 600.0, 1.0));
    backdrop.start();

    for frame in 0..600 {
        let t = frame as f64 / 600.0;
        backdrop.on_pointer_moved(900.0 * t, 300.0 + 200.0 * (t * 12.0).sin());
        assert_eq!(pump(&mut backdrop), 1);

        for p in &backdrop.field().particles {
            assert!(p.position.x >= -5.0 && p.position.x <= 905.0);
            assert!(p.position.y >= -5.0 && p.position.y <= 605.0);
            assert!(p.velocity.x.is_finite() && p.velocity.y.is_finite());
        }
    }

    let discs = backdrop.surface().discs().count();
    assert_eq!(discs, backdrop.field().len());
}

#[test]
fn test_theme_toggle_recolors_next_draw() {
    let sheet = ThemeSheet::default();
    let mut themes = ThemeController::new(None, Theme::Dark);
    let mut backdrop = mount(
        ThemePalette::new(sheet, themes.active()),
        Viewport::new(800.0, 600.0, 1.0),
    );
    backdrop.start();
    pump(&mut backdrop);
    assert_eq!(backdrop.field().palette, Palette::default());

    backdrop.on_theme_change(themes.toggle());
    let light = Rgb::new(37, 99, 235);
    assert_eq!(backdrop.field().palette.dot, light);
    assert!(backdrop.surface().discs().all(|c| match c {
        DrawCommand::Disc { color, .. } => color.rgb == light,
        _ => false,
    }));
    assert_eq!(themes.stored(), Some(Theme::Light));
}

#[test]
fn test_theme_without_tokens_keeps_colors() {
    let mut sheet = ThemeSheet::default();
    sheet.light.clear();
    let mut backdrop = mount(
        ThemePalette::new(sheet, Theme::Dark),
        Viewport::new(800.0, 600.0, 1.0),
    );

    backdrop.on_theme_change(ThemeChange {
        theme: Theme::Light,
    });
    assert_eq!(backdrop.field().palette, Palette::default());
}

#[test]
fn test_resize_regenerates_for_new_area() {
    let mut backdrop = mount(FixedPalette::empty(), Viewport::new(1280.0, 720.0, 1.0));
    backdrop.start();
    assert_eq!(backdrop.field().len(), 51);

    backdrop.on_resize(Viewport::new(4000.0, 3000.0, 2.0));
    assert_eq!(backdrop.field().len(), 140);
    assert_eq!(backdrop.surface().size, (4000.0, 3000.0, 2.0));
    assert!(backdrop
        .field()
        .particles
        .iter()
        .all(|p| p.position.x <= 4000.0 && p.position.y <= 3000.0));

    // The running loop keeps going on the new field.
    assert_eq!(pump(&mut backdrop), 1);
}

#[test]
fn test_disabled_without_surface() {
    let backdrop: Option<Backdrop<ManualFrameDriver, RecordingSurface, FixedPalette>> =
        Backdrop::mount(
            None,
            ManualFrameDriver::new(),
            FixedPalette::empty(),
            ParticleField::with_seed(1),
            &AppSettings::default(),
            Viewport::new(800.0, 600.0, 1.0),
        );
    assert!(backdrop.is_none());
}
