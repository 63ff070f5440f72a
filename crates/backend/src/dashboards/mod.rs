pub mod d400_inventory_overview;
