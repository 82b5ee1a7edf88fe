use iced::color;
use iced::theme::Palette;
use iced::Theme;

use crate::settings::Appearance;

/// Resolve the iced Theme from the appearance setting.
pub fn resolve_theme(appearance: Appearance) -> Theme {
    let is_dark = match appearance {
        Appearance::Dark => true,
        Appearance::Light => false,
        Appearance::System => detect_system_dark_mode(),
    };

    let palette = if is_dark {
        dark_palette()
    } else {
        light_palette()
    };

    Theme::custom("FaceWatch", palette)
}

fn dark_palette() -> Palette {
    Palette {
        background: color!(0x16, 0x18, 0x1d),
        text: color!(0xd4, 0xd4, 0xd8),
        primary: color!(0x4f, 0x8c, 0xe8),
        success: color!(0x2e, 0xc0, 0x62),
        warning: color!(0xf2, 0xb0, 0x1e),
        danger: color!(0xe5, 0x48, 0x4d),
    }
}

fn light_palette() -> Palette {
    Palette {
        background: color!(0xf4, 0xf4, 0xf6),
        text: color!(0x20, 0x22, 0x28),
        primary: color!(0x2d, 0x6c, 0xdf),
        success: color!(0x27, 0xa8, 0x4f),
        warning: color!(0xd9, 0x8a, 0x0b),
        danger: color!(0xd6, 0x2f, 0x35),
    }
}

fn detect_system_dark_mode() -> bool {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
            .map(|o| {
                String::from_utf8_lossy(&o.stdout)
                    .trim()
                    .eq_ignore_ascii_case("dark")
            })
            .unwrap_or(true)
    }
    #[cfg(not(target_os = "macos"))]
    {
        true
    }
}
