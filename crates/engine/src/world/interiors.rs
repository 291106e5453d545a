use super::grid::{Cell, GridMap, GridMapError};
use super::registry::{InteriorDef, InteriorId};
use super::tile::{CollisionClass, TileId};

pub const CRIME_SCENE: &str = "crime_scene";
pub const COMISARIA: &str = "comisaria";
pub const BIBLIOTECA: &str = "biblioteca";
pub const APARTAMENTOS: &str = "apartamentos";
pub const RESTAURANTE: &str = "restaurante";
pub const HOSPITAL: &str = "hospital";
pub const CASA: &str = "casa";

/// Every hand-authored interior, keyed by id.
pub fn build_interiors() -> Result<Vec<(InteriorId, InteriorDef)>, GridMapError> {
    Ok(vec![
        (InteriorId::new(CRIME_SCENE), crime_scene()?),
        (InteriorId::new(COMISARIA), comisaria()?),
        (InteriorId::new(BIBLIOTECA), biblioteca()?),
        (InteriorId::new(APARTAMENTOS), apartamentos()?),
        (InteriorId::new(RESTAURANTE), restaurante()?),
        (InteriorId::new(HOSPITAL), hospital()?),
        (InteriorId::new(CASA), casa()?),
    ])
}

struct Room {
    map: GridMap,
}

impl Room {
    /// Solid wall border, walkable inside, exit door at bottom-centre.
    fn shell(
        width: u32,
        height: u32,
        wall: TileId,
        border_floor: TileId,
        floor: impl Fn(i32, i32) -> TileId,
    ) -> Result<Self, GridMapError> {
        let mut map = GridMap::filled(width, height, border_floor, CollisionClass::Walkable)?;
        let (w, h) = (width as i32, height as i32);
        for y in 0..h {
            for x in 0..w {
                let cell = Cell::new(x, y);
                if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
                    map.place(cell, wall);
                } else {
                    map.set_floor(cell, floor(x, y));
                }
            }
        }
        map.place(Cell::new(w / 2, h - 1), TileId::DoorInt);
        Ok(Self { map })
    }

    fn furnish(&mut self, tile: TileId, cells: &[(i32, i32)]) -> &mut Self {
        for (x, y) in cells {
            self.map.place(Cell::new(*x, *y), tile);
        }
        self
    }

    /// Object-only write; keeps whatever collision the cell already has.
    fn decorate(&mut self, tile: TileId, cells: &[(i32, i32)]) -> &mut Self {
        for (x, y) in cells {
            self.map.set_object(Cell::new(*x, *y), tile);
        }
        self
    }

    fn finish(self, label: &str, building_label: &str, outside_door: Cell) -> InteriorDef {
        let player_start = Cell::new(
            (self.map.width() / 2) as i32,
            self.map.height() as i32 - 2,
        );
        InteriorDef {
            map: self.map,
            player_start,
            outside_door,
            label: label.to_string(),
            building_label: building_label.to_string(),
        }
    }
}

fn crime_scene() -> Result<InteriorDef, GridMapError> {
    let mut room = Room::shell(12, 10, TileId::WallInt, TileId::FloorTile, |x, y| {
        if (x + y) % 3 == 0 {
            TileId::FloorTile
        } else {
            TileId::FloorWood
        }
    })?;
    room.decorate(TileId::Window, &[(3, 0), (5, 0), (8, 0)])
        .furnish(TileId::Counter, &[(1, 1), (2, 1)])
        .furnish(TileId::CashRegister, &[(3, 1)])
        .furnish(TileId::Shelf, &[(9, 1), (10, 1), (10, 2), (10, 3)])
        .furnish(TileId::Overturned, &[(9, 4)])
        .furnish(TileId::Table, &[(4, 4), (5, 4)])
        .furnish(TileId::Chair, &[(4, 3), (5, 5)])
        .decorate(TileId::Blood, &[(3, 5), (3, 6)])
        .decorate(TileId::Blood2, &[(4, 6), (2, 5)])
        .decorate(TileId::BrokenGlass, &[(6, 1)])
        .decorate(TileId::Footprint, &[(3, 7), (5, 7), (6, 8)])
        .decorate(TileId::MarkerNum, &[(1, 5), (5, 6), (7, 1)])
        .decorate(TileId::Paper, &[(7, 7)])
        .furnish(TileId::PlantInt, &[(1, 2)])
        .furnish(TileId::LampInt, &[(8, 3)])
        .decorate(TileId::Rug, &[(6, 6), (7, 6), (6, 7), (7, 7)]);
    Ok(room.finish(
        "ESCENA DEL CRIMEN - Interior",
        "ESCENA DEL CRIMEN",
        Cell::new(21, 6),
    ))
}

fn comisaria() -> Result<InteriorDef, GridMapError> {
    let mut room = Room::shell(14, 10, TileId::WallInt, TileId::FloorTile, |_, _| {
        TileId::FloorTile
    })?;
    room.decorate(TileId::Window, &[(3, 0), (10, 0)])
        .furnish(TileId::FilingCabinet, &[(1, 1), (1, 2)])
        .furnish(TileId::Desk, &[(3, 2), (4, 2)])
        .furnish(TileId::Computer, &[(4, 1)])
        .furnish(TileId::Chair, &[(3, 3)])
        .furnish(TileId::BulletinBoard, &[(6, 1), (7, 1)])
        .furnish(TileId::Whiteboard, &[(8, 1)])
        .furnish(TileId::Bench, &[(11, 1)])
        .furnish(TileId::JailBars, &[(10, 3), (11, 3), (12, 3)])
        .furnish(TileId::Desk, &[(8, 5), (9, 5)])
        .furnish(TileId::Chair, &[(8, 6)])
        .furnish(TileId::PlantInt, &[(1, 8)])
        .furnish(TileId::LampInt, &[(12, 8)]);
    Ok(room.finish("COMISARÍA - Interior", "COMISARÍA", Cell::new(5, 6)))
}

fn biblioteca() -> Result<InteriorDef, GridMapError> {
    let mut room = Room::shell(12, 10, TileId::WallInt, TileId::FloorWood, |_, _| {
        TileId::FloorCarpet
    })?;
    room.furnish(TileId::BookshelfTall, &[(1, 1), (2, 1), (3, 1), (4, 1)])
        .furnish(TileId::Fireplace, &[(6, 1)])
        .furnish(TileId::BookshelfTall, &[(8, 1), (9, 1), (10, 1)])
        .furnish(TileId::ReadingDesk, &[(4, 4), (5, 4)])
        .furnish(TileId::Armchair, &[(3, 5)])
        .furnish(TileId::Globe, &[(10, 5)])
        .furnish(TileId::CardCatalog, &[(1, 6), (1, 7)])
        .furnish(TileId::LampInt, &[(10, 8)]);
    Ok(room.finish("BIBLIOTECA - Interior", "BIBLIOTECA", Cell::new(36, 6)))
}

fn apartamentos() -> Result<InteriorDef, GridMapError> {
    let mut room = Room::shell(12, 10, TileId::WallInt, TileId::FloorWood, |_, _| {
        TileId::FloorWood
    })?;
    room.decorate(TileId::Window, &[(2, 0), (9, 0)])
        .furnish(TileId::Bed, &[(1, 1), (1, 2)])
        .furnish(TileId::Stove, &[(9, 1)])
        .furnish(TileId::Fridge, &[(10, 1)])
        .furnish(TileId::Table, &[(8, 4)])
        .furnish(TileId::Chair, &[(8, 5)])
        .decorate(TileId::Rug, &[(5, 4), (6, 4)])
        .furnish(TileId::Sofa, &[(4, 6), (5, 6)])
        .decorate(TileId::Rope, &[(2, 6)])
        .furnish(TileId::PlantInt, &[(10, 8)]);
    Ok(room.finish("APARTAMENTOS - Interior", "APARTAMENTOS", Cell::new(5, 18)))
}

fn restaurante() -> Result<InteriorDef, GridMapError> {
    let mut room = Room::shell(12, 10, TileId::WallInt, TileId::FloorTile, |_, _| {
        TileId::FloorChecker
    })?;
    room.furnish(TileId::BarCounter, &[(1, 2), (2, 2), (3, 2), (4, 2)])
        .furnish(TileId::BarStool, &[(1, 3), (2, 3), (3, 3), (4, 3)])
        .furnish(TileId::Stove, &[(8, 1)])
        .furnish(TileId::WineRack, &[(10, 1), (10, 2)])
        .furnish(TileId::Table, &[(3, 6), (8, 6)])
        .furnish(TileId::Chair, &[(2, 6), (4, 6), (7, 6), (9, 6)]);
    Ok(room.finish("RESTAURANTE - Interior", "RESTAURANTE", Cell::new(21, 18)))
}

fn hospital() -> Result<InteriorDef, GridMapError> {
    let mut room = Room::shell(12, 10, TileId::WallInt, TileId::FloorHospital, |_, _| {
        TileId::FloorHospital
    })?;
    room.furnish(TileId::HospitalBed, &[(1, 1), (3, 1), (8, 1), (10, 1)])
        .decorate(TileId::Curtain, &[(2, 1), (9, 1)])
        .furnish(TileId::MedicineCabinet, &[(6, 1)])
        .furnish(TileId::IvStand, &[(1, 2), (10, 2)])
        .furnish(TileId::ReceptionDesk, &[(2, 6), (3, 6), (4, 6)])
        .furnish(TileId::PlantInt, &[(10, 8)]);
    Ok(room.finish("HOSPITAL - Interior", "HOSPITAL", Cell::new(36, 18)))
}

fn casa() -> Result<InteriorDef, GridMapError> {
    let mut room = Room::shell(10, 8, TileId::WallDark, TileId::FloorDark, |_, _| {
        TileId::FloorDark
    })?;
    room.furnish(TileId::Barrel, &[(1, 1)])
        .furnish(TileId::Crate, &[(2, 1), (8, 1)])
        .furnish(TileId::Fireplace, &[(5, 1)])
        .decorate(TileId::Rope, &[(4, 3)])
        .furnish(TileId::Armchair, &[(7, 4)]);
    Ok(room.finish("CASA ??? - Interior", "CASA ???", Cell::new(36, 29)))
}
