use super::*;
use crate::oracle::verify::check_geometry;

fn piece(id: &str, width: f64, height: f64) -> Piece {
    Piece { id: id.into(), width, height }
}

fn placed_ids(layout: &OracleLayout) -> Vec<&str> {
    layout.placed_pieces.iter().map(|p| p.id.as_str()).collect()
}

#[test]
fn single_piece_at_origin() {
    let layout = ShelfOracle::pack(&Board { width: 100.0, height: 100.0 }, &[piece("a", 20.0, 30.0)]);
    assert_eq!(layout.placed_pieces, vec![Placement { id: "a".into(), x: 0.0, y: 0.0 }]);
    assert!(layout.unplaced_pieces.is_empty());
}

#[test]
fn fills_shelf_then_opens_next() {
    let board = Board { width: 100.0, height: 100.0 };
    let pieces = [piece("a", 60.0, 40.0), piece("b", 40.0, 40.0), piece("c", 50.0, 30.0)];
    let layout = ShelfOracle::pack(&board, &pieces);

    assert_eq!(placed_ids(&layout), vec!["a", "b", "c"]);
    assert_eq!((layout.placed_pieces[1].x, layout.placed_pieces[1].y), (60.0, 0.0));
    assert_eq!((layout.placed_pieces[2].x, layout.placed_pieces[2].y), (0.0, 40.0));
    assert!(check_geometry(&board, &pieces, &layout).is_ok());
}

#[test]
fn short_piece_reuses_earlier_shelf() {
    let board = Board { width: 100.0, height: 100.0 };
    let pieces = [piece("tall", 70.0, 50.0), piece("wide", 100.0, 40.0), piece("small", 30.0, 10.0)];
    let layout = ShelfOracle::pack(&board, &pieces);

    let small = layout.placed_pieces.iter().find(|p| p.id == "small").unwrap();
    assert_eq!((small.x, small.y), (70.0, 0.0));
    assert!(check_geometry(&board, &pieces, &layout).is_ok());
}

#[test]
fn oversized_and_degenerate_pieces_unplaced() {
    let board = Board { width: 50.0, height: 50.0 };
    let pieces = [piece("big", 60.0, 10.0), piece("zero", 0.0, 10.0), piece("ok", 50.0, 50.0)];
    let layout = ShelfOracle::pack(&board, &pieces);

    assert_eq!(placed_ids(&layout), vec!["ok"]);
    let unplaced: Vec<&str> = layout.unplaced_pieces.iter().map(|u| u.id.as_str()).collect();
    assert!(unplaced.contains(&"big"));
    assert!(unplaced.contains(&"zero"));
}

#[test]
fn overflow_goes_unplaced() {
    let board = Board { width: 10.0, height: 10.0 };
    let pieces: Vec<Piece> = (0..5).map(|i| piece(&format!("p{i}"), 10.0, 4.0)).collect();
    let layout = ShelfOracle::pack(&board, &pieces);

    assert_eq!(layout.placed_pieces.len(), 2);
    assert_eq!(layout.unplaced_pieces.len(), 3);
    assert!(check_geometry(&board, &pieces, &layout).is_ok());
}

#[tokio::test]
async fn oracle_trait_delegates_to_pack() {
    let board = Board { width: 10.0, height: 10.0 };
    let pieces = [piece("a", 5.0, 5.0)];
    let layout = ShelfOracle::new().request_layout(&board, &pieces).await.unwrap();
    assert_eq!(layout, ShelfOracle::pack(&board, &pieces));
    assert!(ShelfOracle::new().request_layout(&board, &[]).await.unwrap().is_empty());
}
