use serde::Serialize;

/// Collision class of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CollisionClass {
    Walkable,
    Solid,
    Interactive,
}

impl CollisionClass {
    pub(crate) const fn as_byte(self) -> u8 {
        match self {
            CollisionClass::Walkable => 0,
            CollisionClass::Solid => 1,
            CollisionClass::Interactive => 2,
        }
    }
}

/// Closed set of tile kinds. `Empty` means no object on that layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TileId {
    Empty,
    // ground
    Grass,
    Grass2,
    Grass3,
    Dirt,
    RoadH,
    RoadV,
    RoadCross,
    Sidewalk,
    // buildings
    Wall,
    Window,
    Roof,
    Door,
    // street props
    Tree,
    Tree2,
    Bench,
    Lamp,
    Trash,
    Hydrant,
    Mailbox,
    // crime scene dressing
    PoliceCar,
    CrimeTape,
    ChalkOutline,
    Cone,
    // interior shell
    FloorWood,
    FloorTile,
    FloorChecker,
    FloorHospital,
    FloorCarpet,
    FloorDark,
    WallInt,
    WallDark,
    DoorInt,
    // interior furniture
    Counter,
    Shelf,
    Table,
    Chair,
    CashRegister,
    Overturned,
    LampInt,
    PlantInt,
    Rug,
    Desk,
    FilingCabinet,
    BulletinBoard,
    JailBars,
    Computer,
    Whiteboard,
    Bed,
    Stove,
    Fridge,
    Sofa,
    Bookshelf,
    BookshelfTall,
    ReadingDesk,
    Globe,
    CardCatalog,
    Armchair,
    Fireplace,
    BarCounter,
    BarStool,
    WineRack,
    HospitalBed,
    Curtain,
    MedicineCabinet,
    IvStand,
    ReceptionDesk,
    Barrel,
    Crate,
    // clues and decals
    Blood,
    Blood2,
    BrokenGlass,
    Footprint,
    MarkerNum,
    Paper,
    Rope,
    Evidence,
}

impl TileId {
    pub fn is_evidence(self) -> bool {
        self == TileId::Evidence
    }

    pub fn is_empty(self) -> bool {
        self == TileId::Empty
    }

    pub(crate) fn code(self) -> u16 {
        self as u16
    }
}

/// Default collision class a generator assigns when it places `tile`.
pub fn collision_class_of(tile: TileId) -> CollisionClass {
    use TileId::*;

    match tile {
        Door | DoorInt => CollisionClass::Interactive,
        Wall | Window | Roof | Tree | Tree2 | Bench | Lamp | Trash | Hydrant | Mailbox
        | PoliceCar | Cone | WallInt | WallDark | Counter | Shelf | Table | Chair
        | CashRegister | Overturned | LampInt | PlantInt | Desk | FilingCabinet
        | BulletinBoard | JailBars | Computer | Whiteboard | Bed | Stove | Fridge | Sofa
        | Bookshelf | BookshelfTall | ReadingDesk | Globe | CardCatalog | Armchair
        | Fireplace | BarCounter | WineRack | HospitalBed | MedicineCabinet | IvStand
        | ReceptionDesk | Barrel | Crate => CollisionClass::Solid,
        Empty | Grass | Grass2 | Grass3 | Dirt | RoadH | RoadV | RoadCross | Sidewalk
        | CrimeTape | ChalkOutline | FloorWood | FloorTile | FloorChecker | FloorHospital
        | FloorCarpet | FloorDark | Rug | BarStool | Curtain | Blood | Blood2 | BrokenGlass
        | Footprint | MarkerNum | Paper | Rope | Evidence => CollisionClass::Walkable,
    }
}

/// Fallback presentation of a tile: a flat colour for pixel renderers and a
/// glyph for text frontends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DrawSpec {
    pub name: &'static str,
    pub color: &'static str,
    pub glyph: char,
}

const fn spec(name: &'static str, color: &'static str, glyph: char) -> DrawSpec {
    DrawSpec { name, color, glyph }
}

pub fn draw_spec_of(tile: TileId) -> DrawSpec {
    use TileId::*;

    match tile {
        Empty => spec("empty", "#000000", ' '),
        Grass => spec("grass", "#3a7d22", '.'),
        Grass2 => spec("grass2", "#4a8d32", ','),
        Grass3 => spec("grass3", "#2e6a18", '\''),
        Dirt => spec("dirt", "#8b7355", ':'),
        RoadH => spec("road_h", "#505050", '='),
        RoadV => spec("road_v", "#505050", '|'),
        RoadCross => spec("road_cross", "#585858", '+'),
        Sidewalk => spec("sidewalk", "#b0a898", '_'),
        Wall => spec("wall", "#7a5636", '#'),
        Window => spec("window", "#7a5636", 'o'),
        Roof => spec("roof", "#8b2020", '^'),
        Door => spec("door", "#c68c3c", 'D'),
        Tree => spec("tree", "#3a7d22", 'T'),
        Tree2 => spec("tree2", "#4a8d32", 't'),
        Bench => spec("bench", "#8b6914", 'b'),
        Lamp => spec("lamp", "#b0a898", 'l'),
        Trash => spec("trash", "#666666", 'u'),
        Hydrant => spec("hydrant", "#dd2222", 'h'),
        Mailbox => spec("mailbox", "#2255cc", 'm'),
        PoliceCar => spec("police_car", "#1144cc", 'P'),
        CrimeTape => spec("crime_tape", "#ffdd00", '~'),
        ChalkOutline => spec("chalk_outline", "#ffffff", 'x'),
        Cone => spec("cone", "#ff6600", 'A'),
        FloorWood => spec("floor_wood", "#8b6b4a", '.'),
        FloorTile => spec("floor_tile", "#9e9e8e", ','),
        FloorChecker => spec("floor_checker", "#ddd8c8", '.'),
        FloorHospital => spec("floor_hospital", "#e4e8e0", '.'),
        FloorCarpet => spec("floor_carpet", "#7a4040", ','),
        FloorDark => spec("floor_dark", "#3a3530", '.'),
        WallInt => spec("wall_int", "#5c4033", '#'),
        WallDark => spec("wall_dark", "#4a4540", '#'),
        DoorInt => spec("door_int", "#c68c3c", 'D'),
        Counter => spec("counter", "#6b5040", 'C'),
        Shelf => spec("shelf", "#7a6050", 'S'),
        Table => spec("table", "#5c3d2e", 'n'),
        Chair => spec("chair", "#8b6914", 'c'),
        CashRegister => spec("cash_register", "#556655", '$'),
        Overturned => spec("overturned", "#7a6050", '%'),
        LampInt => spec("lamp_int", "#d4c090", 'l'),
        PlantInt => spec("plant_int", "#3a7d22", 'p'),
        Rug => spec("rug", "#8b3a3a", 'r'),
        Desk => spec("desk", "#6b5040", 'k'),
        FilingCabinet => spec("filing_cabinet", "#707878", 'F'),
        BulletinBoard => spec("bulletin_board", "#c4a46c", 'B'),
        JailBars => spec("jail_bars", "#555555", 'I'),
        Computer => spec("computer", "#6b5040", 'q'),
        Whiteboard => spec("whiteboard", "#f0f0f0", 'W'),
        Bed => spec("bed", "#8b4513", 'z'),
        Stove => spec("stove", "#444444", 'O'),
        Fridge => spec("fridge", "#d0d0d0", 'R'),
        Sofa => spec("sofa", "#6b4226", 's'),
        Bookshelf => spec("bookshelf", "#5c3d2e", 'E'),
        BookshelfTall => spec("bookshelf_tall", "#5a3a1e", 'H'),
        ReadingDesk => spec("reading_desk", "#6b4e2e", 'k'),
        Globe => spec("globe", "#3080a0", 'G'),
        CardCatalog => spec("card_catalog", "#7a6040", 'K'),
        Armchair => spec("armchair", "#6b3030", 'a'),
        Fireplace => spec("fireplace", "#5a3020", 'f'),
        BarCounter => spec("bar_counter", "#4a3020", 'C'),
        BarStool => spec("bar_stool", "#555555", 'i'),
        WineRack => spec("wine_rack", "#3c2415", 'V'),
        HospitalBed => spec("hospital_bed", "#e8e8f0", 'z'),
        Curtain => spec("curtain", "#a8d8ea", '"'),
        MedicineCabinet => spec("medicine_cabinet", "#f0f0f0", 'M'),
        IvStand => spec("iv_stand", "#c0c0c0", 'j'),
        ReceptionDesk => spec("reception_desk", "#5a8abf", 'C'),
        Barrel => spec("barrel", "#6b4226", '0'),
        Crate => spec("crate", "#7a6030", 'X'),
        Blood => spec("blood", "#5a0000", '*'),
        Blood2 => spec("blood2", "#7a1111", '*'),
        BrokenGlass => spec("broken_glass", "#aabbcc", ';'),
        Footprint => spec("footprint", "#3a2010", 'v'),
        MarkerNum => spec("marker_num", "#ffcc00", '1'),
        Paper => spec("paper", "#f0e8d0", 'e'),
        Rope => spec("rope", "#8b7355", '&'),
        Evidence => spec("evidence", "#ffcc00", '?'),
    }
}
