pub mod terminal;

use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::{CYAN, GRAY, MAGENTA, ORANGE, RGB, WHITE, YELLOW};

use crate::{
    data,
    error::SessionError,
    game::{GameState, MessageTone},
    lighting::{MemoryField, VisibilityField},
    map::{CellKind, Grid},
};

pub const PLAYER_GLYPH: char = '@';
pub const KEY_GLYPH: char = 'K';
pub const EXIT_GLYPH: char = 'E';
pub const TORCH_GLYPH: char = '!';
pub const FOG_GLYPH: char = ' ';

/// Highest brightness step; intensities above it share its style.
pub const MAX_BRIGHTNESS: u32 = 3;

/// What a cell or text span should look like, independent of the backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StyleTag {
    Player,
    Key,
    Exit,
    Torch,
    /// Lit terrain at brightness `0..=MAX_BRIGHTNESS`.
    Lit(u8),
    Remembered,
    Fog,
    Title,
    Header,
    Lore,
    Hint,
    Message(MessageTone),
}

impl StyleTag {
    pub fn for_intensity(intensity: u32) -> Self {
        StyleTag::Lit(intensity.min(MAX_BRIGHTNESS) as u8)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Style {
    pub fg: RGB,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
}

impl Style {
    const fn plain(fg: RGB) -> Self {
        Self {
            fg,
            bold: false,
            dim: false,
            italic: false,
        }
    }

    const fn bold(fg: RGB) -> Self {
        Self {
            fg,
            bold: true,
            dim: false,
            italic: false,
        }
    }

    const fn dim(fg: RGB) -> Self {
        Self {
            fg,
            bold: false,
            dim: true,
            italic: false,
        }
    }
}

pub fn style_for(tag: StyleTag) -> Style {
    match tag {
        StyleTag::Player => Style::bold(RGB::named(YELLOW)),
        StyleTag::Key => Style::bold(RGB::named(MAGENTA)),
        StyleTag::Exit => Style::bold(RGB::named(CYAN)),
        StyleTag::Torch => Style::bold(RGB::from_u8(255, 0, 0)),
        StyleTag::Lit(0) => Style::dim(RGB::from_u8(127, 127, 127)),
        StyleTag::Lit(1) => Style::plain(RGB::from_u8(139, 0, 0)),
        StyleTag::Lit(2) => Style::plain(RGB::from_u8(205, 0, 0)),
        StyleTag::Lit(_) => Style::bold(RGB::from_u8(255, 0, 0)),
        StyleTag::Remembered => Style::plain(RGB::from_u8(58, 58, 58)),
        StyleTag::Fog => Style::dim(RGB::from_u8(0, 0, 0)),
        StyleTag::Title => Style::bold(RGB::named(WHITE)),
        StyleTag::Header => Style::bold(RGB::named(WHITE)),
        StyleTag::Lore => Style {
            italic: true,
            ..Style::dim(RGB::named(GRAY))
        },
        StyleTag::Hint => Style::dim(RGB::named(GRAY)),
        StyleTag::Message(MessageTone::Info) => Style::plain(RGB::named(GRAY)),
        StyleTag::Message(MessageTone::Progress) => Style::bold(RGB::named(YELLOW)),
        StyleTag::Message(MessageTone::Warning) => Style::bold(RGB::named(ORANGE)),
        StyleTag::Message(MessageTone::Triumph) => Style::bold(RGB::from_u8(0, 255, 0)),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DisplayCell {
    pub glyph: char,
    pub style: StyleTag,
}

impl DisplayCell {
    const fn new(glyph: char, style: StyleTag) -> Self {
        Self { glyph, style }
    }
}

/// Entity positions drawn over the terrain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityOverlay {
    pub player: Point,
    pub keys: Vec<Point>,
    pub exit: Point,
    pub torches: Vec<Point>,
}

impl EntityOverlay {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            player: state.player(),
            keys: state.uncollected_keys().collect(),
            exit: state.exit(),
            torches: state.lights().torches().collect(),
        }
    }
}

/// Resolves every cell to a glyph and style.
///
/// Precedence: the player always shows; lit cells show key, exit, torch or
/// terrain by brightness; remembered cells show terrain in the remembered
/// style; everything else is fog. Entities only show on lit cells.
pub fn project(
    grid: &Grid,
    visibility: &VisibilityField,
    memory: &MemoryField,
    overlay: &EntityOverlay,
) -> Vec<Vec<DisplayCell>> {
    let mut rows = Vec::with_capacity(grid.height.max(0) as usize);
    for y in 0..grid.height {
        let mut row = Vec::with_capacity(grid.width.max(0) as usize);
        for x in 0..grid.width {
            let point = Point::new(x, y);
            row.push(project_cell(grid, visibility, memory, overlay, point));
        }
        rows.push(row);
    }
    rows
}

fn project_cell(
    grid: &Grid,
    visibility: &VisibilityField,
    memory: &MemoryField,
    overlay: &EntityOverlay,
    point: Point,
) -> DisplayCell {
    if point == overlay.player {
        return DisplayCell::new(PLAYER_GLYPH, StyleTag::Player);
    }
    let terrain = grid.cell_at(point);
    if visibility.is_lit(point) {
        if overlay.keys.contains(&point) {
            return DisplayCell::new(KEY_GLYPH, StyleTag::Key);
        }
        if point == overlay.exit {
            return DisplayCell::new(EXIT_GLYPH, StyleTag::Exit);
        }
        if overlay.torches.contains(&point) {
            return DisplayCell::new(TORCH_GLYPH, StyleTag::Torch);
        }
        return match terrain {
            Some(kind) => DisplayCell::new(
                kind.glyph(),
                StyleTag::for_intensity(visibility.intensity_at(point)),
            ),
            None => DisplayCell::new(FOG_GLYPH, StyleTag::Fog),
        };
    }
    if memory.ever_seen(point) {
        return match terrain {
            Some(kind @ (CellKind::Wall | CellKind::Floor)) => {
                DisplayCell::new(kind.glyph(), StyleTag::Remembered)
            }
            None => DisplayCell::new(FOG_GLYPH, StyleTag::Fog),
        };
    }
    DisplayCell::new(FOG_GLYPH, StyleTag::Fog)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: StyleTag,
}

impl Span {
    pub fn new<S: Into<String>>(text: S, style: StyleTag) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn styled<S: Into<String>>(text: S, style: StyleTag) -> Self {
        Self {
            spans: vec![Span::new(text, style)],
        }
    }

    pub fn blank() -> Self {
        Self::default()
    }

    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

/// One full screen: header lines, the map, then status lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub header: Vec<Line>,
    pub map: Vec<Vec<DisplayCell>>,
    pub footer: Vec<Line>,
    pub centered: bool,
}

impl Frame {
    pub fn title() -> Self {
        let mut header = vec![
            Line::styled(data::TITLE, StyleTag::Title),
            Line::blank(),
        ];
        header.extend(
            data::TITLE_LORE
                .iter()
                .map(|line| Line::styled(*line, StyleTag::Lore)),
        );
        header.push(Line::blank());
        header.push(Line::styled(data::TITLE_PROMPT, StyleTag::Header));
        Self {
            header,
            map: Vec::new(),
            footer: Vec::new(),
            centered: true,
        }
    }

    pub fn play(state: &GameState, visibility: &VisibilityField, memory: &MemoryField) -> Self {
        let overlay = EntityOverlay::from_state(state);
        let map = project(state.grid(), visibility, memory, &overlay);

        let header = vec![
            Line {
                spans: vec![
                    Span::new(data::TITLE, StyleTag::Header),
                    Span::new(format!(" - {}", data::HEADER), StyleTag::Hint),
                ],
            },
            Line::blank(),
        ];

        let mut status = vec![
            Span::new("Torches left: ", StyleTag::Header),
            Span::new(state.lights().remaining().to_string(), StyleTag::Torch),
            Span::new("  Keys: ", StyleTag::Header),
            Span::new(
                format!("{}/{}", state.collected_count(), state.total_keys()),
                StyleTag::Key,
            ),
        ];
        if state.may_exit() {
            status.push(Span::new(format!("  {}", data::EXIT_OPEN), StyleTag::Exit));
        }
        if !state.lights().ambient_active() {
            status.push(Span::new("  Your ember is out.", StyleTag::Hint));
        }

        let message = state.message();
        let footer = vec![
            Line { spans: status },
            Line::styled(message.text.clone(), StyleTag::Message(message.tone)),
            Line::styled(data::CONTROLS, StyleTag::Hint),
            legend(),
        ];

        Self {
            header,
            map,
            footer,
            centered: false,
        }
    }

    #[cfg(test)]
    pub fn map_text(&self) -> Vec<String> {
        self.map
            .iter()
            .map(|row| row.iter().map(|cell| cell.glyph).collect())
            .collect()
    }
}

fn legend() -> Line {
    Line {
        spans: vec![
            Span::new("Legend: ", StyleTag::Hint),
            Span::new(PLAYER_GLYPH.to_string(), StyleTag::Player),
            Span::new(" you  ", StyleTag::Hint),
            Span::new(TORCH_GLYPH.to_string(), StyleTag::Torch),
            Span::new(" torch  ", StyleTag::Hint),
            Span::new(KEY_GLYPH.to_string(), StyleTag::Key),
            Span::new(" key  ", StyleTag::Hint),
            Span::new(EXIT_GLYPH.to_string(), StyleTag::Exit),
            Span::new(" exit", StyleTag::Hint),
        ],
    }
}

/// Anything that can show a full frame.
pub trait RenderSink {
    fn present(&mut self, frame: &Frame) -> Result<(), SessionError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, tests::scenario_dungeon};
    use crate::lighting::{LightBlend, LightingEngine, LightingParams};
    use bracket_random::prelude::RandomNumberGenerator;

    fn steady_engine() -> LightingEngine {
        LightingEngine::new(
            LightingParams {
                ambient_radius: 3,
                torch_radius: 3,
                flicker_chance: 0.0,
                blend: LightBlend::Max,
            },
            RandomNumberGenerator::seeded(7),
        )
    }

    fn overlay() -> EntityOverlay {
        EntityOverlay {
            player: Point::new(5, 5),
            keys: vec![Point::new(5, 3)],
            exit: Point::new(6, 5),
            torches: vec![Point::new(4, 5)],
        }
    }

    #[test]
    fn test_player_shows_even_in_the_dark() {
        let grid = scenario_dungeon(vec![]).grid;
        let visibility = VisibilityField::dark(10, 10);
        let memory = MemoryField::new(10, 10);
        let rows = project(&grid, &visibility, &memory, &overlay());
        assert_eq!(rows[5][5], DisplayCell::new(PLAYER_GLYPH, StyleTag::Player));
        // nothing else is drawn
        assert_eq!(rows[3][5], DisplayCell::new(FOG_GLYPH, StyleTag::Fog));
        assert_eq!(rows[5][6], DisplayCell::new(FOG_GLYPH, StyleTag::Fog));
        assert_eq!(rows[5][4], DisplayCell::new(FOG_GLYPH, StyleTag::Fog));
    }

    #[test]
    fn test_lit_cells_show_entities_then_terrain() {
        let grid = scenario_dungeon(vec![]).grid;
        let mut memory = MemoryField::new(10, 10);
        let sources = crate::lighting::LightSources::new(3);
        let visibility = steady_engine().recompute(&grid, &sources, Point::new(5, 5), &mut memory);
        let rows = project(&grid, &visibility, &memory, &overlay());

        assert_eq!(rows[3][5].style, StyleTag::Key);
        assert_eq!(rows[5][6].style, StyleTag::Exit);
        assert_eq!(rows[5][4].style, StyleTag::Torch);
        assert_eq!(rows[4][5], DisplayCell::new('.', StyleTag::Lit(2)));
        assert_eq!(rows[4][4], DisplayCell::new('#', StyleTag::Lit(1)));
        assert_eq!(rows[2][5], DisplayCell::new('.', StyleTag::Lit(0)));
        assert_eq!(rows[1][5], DisplayCell::new(FOG_GLYPH, StyleTag::Fog));
    }

    #[test]
    fn test_remembered_cells_hide_entities() {
        let grid = scenario_dungeon(vec![]).grid;
        let mut memory = MemoryField::new(10, 10);
        let mut lighting = steady_engine();
        lighting.recompute(
            &grid,
            &crate::lighting::LightSources::new(3),
            Point::new(5, 5),
            &mut memory,
        );
        let dark = lighting.recompute(
            &grid,
            &crate::lighting::LightSources::new(0),
            Point::new(5, 5),
            &mut memory,
        );
        let mut moved = overlay();
        moved.player = Point::new(1, 1);
        let rows = project(&grid, &dark, &memory, &moved);

        assert_eq!(rows[3][5], DisplayCell::new('.', StyleTag::Remembered));
        assert_eq!(rows[5][6], DisplayCell::new('.', StyleTag::Remembered));
        assert_eq!(rows[5][4], DisplayCell::new('.', StyleTag::Remembered));
        assert_eq!(rows[4][4], DisplayCell::new('#', StyleTag::Remembered));
        assert_eq!(rows[8][8], DisplayCell::new(FOG_GLYPH, StyleTag::Fog));
    }

    #[test]
    fn test_brightness_is_clamped() {
        assert_eq!(StyleTag::for_intensity(0), StyleTag::Lit(0));
        assert_eq!(StyleTag::for_intensity(3), StyleTag::Lit(3));
        assert_eq!(StyleTag::for_intensity(9), StyleTag::Lit(3));
        assert_eq!(style_for(StyleTag::Lit(3)), style_for(StyleTag::Lit(7)));
    }

    #[test]
    fn test_projection_is_pure() {
        let grid = scenario_dungeon(vec![]).grid;
        let mut memory = MemoryField::new(10, 10);
        let mut lighting = LightingEngine::new(
            LightingParams {
                ambient_radius: 3,
                torch_radius: 3,
                flicker_chance: 0.5,
                blend: LightBlend::Max,
            },
            RandomNumberGenerator::seeded(3),
        );
        let visibility = lighting.recompute(
            &grid,
            &crate::lighting::LightSources::new(3),
            Point::new(5, 5),
            &mut memory,
        );
        let first = project(&grid, &visibility, &memory, &overlay());
        let second = project(&grid, &visibility, &memory, &overlay());
        assert_eq!(first, second);
    }

    #[test]
    fn test_play_frame_status_lines() {
        let mut state = GameState::new(scenario_dungeon(vec![Point::new(5, 4)]), 3);
        state.begin();
        let mut memory = MemoryField::new(10, 10);
        let visibility =
            steady_engine().recompute(state.grid(), state.lights(), state.player(), &mut memory);
        let before = Frame::play(&state, &visibility, &memory);
        assert_eq!(before.footer[0].plain_text(), "Torches left: 3  Keys: 0/1");

        state.try_move(Direction::North);
        state.place_light();
        let mut memory = MemoryField::new(10, 10);
        let visibility =
            steady_engine().recompute(state.grid(), state.lights(), state.player(), &mut memory);
        let frame = Frame::play(&state, &visibility, &memory);

        assert_eq!(frame.map.len(), 10);
        let footer: Vec<String> = frame.footer.iter().map(Line::plain_text).collect();
        assert_eq!(footer[0], "Torches left: 2  Keys: 1/1  The exit is open.");
        assert!(footer[1].contains("1/1"));
        assert_eq!(frame.footer[1].spans[0].style, StyleTag::Message(MessageTone::Triumph));
        assert!(footer[3].starts_with("Legend:"));
        // player stands on its own torch
        assert_eq!(frame.map_text()[4].chars().nth(5), Some(PLAYER_GLYPH));
    }

    #[test]
    fn test_title_frame_is_centered_lore() {
        let frame = Frame::title();
        assert!(frame.centered);
        assert!(frame.map.is_empty());
        assert_eq!(frame.header[0].plain_text(), data::TITLE);
        assert!(
            frame
                .header
                .iter()
                .any(|line| line.plain_text() == data::TITLE_PROMPT)
        );
    }
}
