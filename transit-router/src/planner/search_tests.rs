//! Unit tests for the route search engine.

use super::*;
use crate::domain::{LineId, TourId};
use crate::network::NetworkBuilder;
use proptest::prelude::*;

fn t(s: &str) -> ClockTime {
    ClockTime::parse_hhmm(s).unwrap()
}

/// Small timetable builder keyed by station name.
struct Fixture {
    builder: NetworkBuilder,
}

impl Fixture {
    fn new(stations: &[&str]) -> Self {
        let mut builder = NetworkBuilder::new();
        for name in stations {
            builder.add_station(*name, 0.0, 0.0).unwrap();
        }
        Self { builder }
    }

    fn edge(
        &mut self,
        from: u32,
        to: u32,
        line: &str,
        tour: u32,
        dep: &str,
        arr: &str,
    ) -> Edge {
        let line = self.builder.line(line).unwrap();
        self.builder
            .add_edge(StationId(from), line, TourId(tour), StationId(to), t(dep), t(arr))
            .unwrap()
    }

    fn build(self) -> TransitNetwork {
        self.builder.build()
    }
}

fn search(
    network: &TransitNetwork,
    source: StationId,
    destinations: Destinations,
    start: ClockTime,
    min_transfer: i64,
    max_duration: i64,
) -> SearchOutcome {
    let cancel = CancelToken::never();
    let request = SearchRequest::new(source, destinations, start, min_transfer, max_duration);
    RouteSearch::new(network, &cancel).run(&request).unwrap()
}

fn route_to(
    network: &TransitNetwork,
    source: StationId,
    destination: StationId,
    start: ClockTime,
    min_transfer: i64,
    max_duration: i64,
) -> Option<Vec<Edge>> {
    search(
        network,
        source,
        Destinations::single(destination),
        start,
        min_transfer,
        max_duration,
    )
    .edges(destination)
}

#[test]
fn changes_to_a_faster_line_when_transfer_allows() {
    let mut f = Fixture::new(&["A", "B", "C"]);
    let ab = f.edge(0, 1, "B1", 1, "00:00", "00:01");
    f.edge(1, 2, "B1", 1, "00:01", "00:05");
    let bc = f.edge(1, 2, "B2", 1, "00:03", "00:04");
    let network = f.build();

    let route = route_to(&network, StationId(0), StationId(2), t("00:00"), 2, 1440).unwrap();
    assert_eq!(route, vec![ab, bc]);
}

#[test]
fn staying_aboard_needs_no_transfer_time() {
    let mut f = Fixture::new(&["A", "B", "C"]);
    f.edge(0, 1, "B1", 1, "00:00", "00:01");
    let ab = f.edge(0, 1, "B2", 1, "00:01", "00:02");
    let bc = f.edge(1, 2, "B2", 1, "00:02", "00:03");
    f.edge(1, 2, "B3", 1, "00:03", "00:04");
    let network = f.build();

    let route = route_to(&network, StationId(0), StationId(2), t("00:00"), 5, 1440).unwrap();
    assert_eq!(route, vec![ab, bc]);

    // The earliest arrival at B does not block continuing on B2 from a later arrival.
    let outcome = search(&network, StationId(0), Destinations::All, t("00:00"), 5, 1440);
    let arrival = |id| {
        outcome
            .edges(id)
            .and_then(|edges| edges.last().map(|e| e.arrival()))
    };
    assert_eq!(arrival(StationId(1)), Some(t("00:01")));
    assert_eq!(arrival(StationId(2)), Some(t("00:03")));
}

fn general_network() -> TransitNetwork {
    let mut f = Fixture::new(&["a", "b", "c", "d", "e"]);
    f.edge(0, 2, "1", 0, "03:10", "03:13");
    f.edge(0, 1, "1", 1, "03:10", "03:12");
    f.edge(0, 3, "1", 2, "03:10", "03:11");
    f.edge(1, 0, "1", 0, "03:10", "03:20");
    f.edge(1, 2, "1", 2, "03:09", "03:10");
    f.edge(2, 0, "1", 0, "02:00", "02:01");
    f.edge(3, 0, "1", 5, "00:01", "00:02");
    f.edge(3, 1, "1", 6, "00:02", "00:03");
    f.edge(3, 2, "1", 7, "00:03", "00:04");
    f.edge(3, 4, "1", 8, "00:04", "00:05");
    f.build()
}

#[test]
fn waits_across_midnight_for_the_only_connection() {
    let network = general_network();
    let (c, e) = (StationId(2), StationId(4));

    let route = route_to(&network, c, e, t("02:00"), 0, 1440).unwrap();
    let visited: Vec<u32> = std::iter::once(route[0].from())
        .chain(route.iter().map(|edge| edge.to()))
        .map(|id| id.0)
        .collect();
    assert_eq!(visited, vec![2, 0, 3, 4]);

    // 02:00 -> 00:05 the next day
    let outcome = search(&network, c, Destinations::single(e), t("02:00"), 0, 1440);
    assert_eq!(outcome.elapsed(e), Some(1325));

    assert!(route_to(&network, e, c, t("02:00"), 0, 1440).is_none());
}

fn line_changing_network() -> TransitNetwork {
    let mut f = Fixture::new(&["e", "f", "g", "h"]);
    let (e, g, h) = (0, 2, 3);
    f.edge(e, h, "1", 0, "23:59", "00:01");
    f.edge(e, h, "1", 1, "00:07", "00:00");
    f.edge(e, h, "1", 2, "00:00", "00:06");
    f.edge(e, h, "1", 3, "00:06", "00:08");
    f.edge(e, h, "1", 4, "00:50", "01:00");
    f.edge(e, 1, "1", 5, "00:00", "00:02");
    f.edge(e, 1, "2", 0, "00:00", "00:01");
    f.edge(e, g, "1", 6, "00:01", "00:03");
    f.edge(1, h, "1", 7, "01:02", "01:03");
    f.edge(1, h, "1", 5, "00:02", "00:05");
    f.edge(g, h, "2", 0, "00:03", "00:04");
    f.edge(g, h, "1", 6, "00:04", "00:07");
    f.edge(g, h, "1", 8, "00:01", "00:02");
    f.build()
}

#[test]
fn transfer_time_changes_the_best_line() {
    let network = line_changing_network();
    let (e, h) = (StationId(0), StationId(3));
    let arrival_minute = |min_transfer, max_duration| {
        route_to(&network, e, h, ClockTime::MIDNIGHT, min_transfer, max_duration)
            .and_then(|edges| edges.last().map(|edge| edge.arrival().minutes_of_day()))
    };

    assert_eq!(arrival_minute(0, 1440), Some(4));
    assert_eq!(arrival_minute(1, 1440), Some(5));
    assert_eq!(arrival_minute(0, 0), None);
    assert_eq!(arrival_minute(0, 60), Some(4));
    assert_eq!(arrival_minute(2, 1440), Some(5));
}

#[test]
fn unreachable_when_transfer_is_too_short() {
    let mut f = Fixture::new(&["A", "B", "C"]);
    f.edge(0, 1, "1", 0, "08:00", "08:10");
    f.edge(1, 2, "2", 0, "08:12", "08:20");
    let network = f.build();

    assert!(route_to(&network, StationId(0), StationId(2), t("08:00"), 2, 60).is_some());
    // A 3 minute change misses the 08:12 and nothing else leaves B within an hour
    assert!(route_to(&network, StationId(0), StationId(2), t("08:00"), 3, 60).is_none());
    // waits are always shorter than a day, so a longer limit does not help
    assert!(route_to(&network, StationId(0), StationId(2), t("08:00"), 3, 1440 * 2).is_none());
}

#[test]
fn duration_limit_is_inclusive() {
    let mut f = Fixture::new(&["A", "B"]);
    f.edge(0, 1, "1", 0, "10:05", "10:30");
    let network = f.build();
    let (a, b) = (StationId(0), StationId(1));

    assert!(route_to(&network, a, b, t("10:00"), 0, 30).is_some());
    assert!(route_to(&network, a, b, t("10:00"), 0, 29).is_none());
}

#[test]
fn source_maps_to_empty_route() {
    let network = general_network();
    let c = StationId(2);
    let outcome = search(&network, c, Destinations::single(c), t("02:00"), 0, 1440);

    assert_eq!(outcome.routes.len(), 1);
    assert!(outcome.is_reachable(c));
    assert_eq!(outcome.elapsed(c), Some(0));
    assert_eq!(outcome.edges(c), Some(vec![]));
    assert_eq!(outcome.routes_explored, 0);
}

#[test]
fn isolated_source_reaches_nothing() {
    let mut f = Fixture::new(&["A", "B"]);
    f.edge(1, 0, "1", 0, "10:00", "10:30");
    let network = f.build();

    let outcome = search(&network, StationId(0), Destinations::All, t("10:00"), 0, 1440);
    assert_eq!(outcome.routes.keys().copied().collect::<Vec<_>>(), vec![StationId(0)]);
    assert!(!outcome.is_reachable(StationId(1)));
    assert_eq!(outcome.edges(StationId(1)), None);
}

#[test]
fn single_destination_stops_early() {
    let network = general_network();
    let (c, a) = (StationId(2), StationId(0));

    let narrow = search(&network, c, Destinations::single(a), t("02:00"), 0, 1440);
    let full = search(&network, c, Destinations::All, t("02:00"), 0, 1440);

    assert_eq!(narrow.edges(a), full.edges(a));
    assert!(narrow.routes_explored < full.routes_explored);
    assert!(!narrow.is_reachable(StationId(4)));
    assert!(full.is_reachable(StationId(4)));
}

#[test]
fn routes_never_revisit_the_source() {
    let mut f = Fixture::new(&["A", "B", "C"]);
    let ab = f.edge(0, 1, "1", 0, "09:00", "09:05");
    f.edge(1, 0, "1", 0, "09:05", "09:10");
    let ac = f.edge(0, 2, "2", 0, "09:00", "09:30");
    let network = f.build();

    let outcome = search(&network, StationId(0), Destinations::All, t("09:00"), 0, 1440);
    assert!(outcome.routes[&StationId(0)].is_none());
    assert_eq!(outcome.edges(StationId(1)), Some(vec![ab]));
    assert_eq!(outcome.edges(StationId(2)), Some(vec![ac]));
}

#[test]
fn cancelled_search_returns_error() {
    let network = general_network();
    let cancel = CancelToken::new();
    cancel.cancel();

    let request = SearchRequest::new(
        StationId(2),
        Destinations::All,
        t("02:00"),
        0,
        1440,
    );
    let result = RouteSearch::new(&network, &cancel).run(&request);
    assert_eq!(result.unwrap_err(), SearchError::Cancelled);
}

/// Two ways from A to B, the later one on line 2, which carries on to C.
/// D is isolated so the search runs until the queue is empty.
fn later_arrival_network(
    later_arrival: &str,
    continues_at: &str,
    arrives: &str,
) -> (TransitNetwork, [Edge; 3]) {
    let mut f = Fixture::new(&["A", "B", "C", "D"]);
    let early = f.edge(0, 1, "1", 0, "10:00", "10:01");
    let late = f.edge(0, 1, "2", 0, "10:00", later_arrival);
    let onward = f.edge(1, 2, "2", 0, continues_at, arrives);
    (f.build(), [early, late, onward])
}

#[test]
fn later_arrival_continues_its_tour_inside_the_transfer_window() {
    // B is settled at 10:01; line 2 arrives 4 minutes later and leaves again
    // before a 5 minute change from 10:01 would allow.
    let (network, [_, late, onward]) = later_arrival_network("10:05", "10:05", "10:08");
    let outcome = search(&network, StationId(0), Destinations::All, t("10:00"), 5, 1440);

    assert_eq!(outcome.edges(StationId(2)), Some(vec![late, onward]));
    assert_eq!(outcome.elapsed(StationId(2)), Some(8));
    assert_eq!(outcome.routes_explored, 3);
}

#[test]
fn later_arrival_at_the_transfer_window_is_pruned() {
    // Line 2 arrives exactly 5 minutes after the settled arrival, so the
    // settled route can change onto it and the later one is not extended.
    let (network, [early, _, onward]) = later_arrival_network("10:06", "10:06", "10:09");
    let outcome = search(&network, StationId(0), Destinations::All, t("10:00"), 5, 1440);

    assert_eq!(outcome.edges(StationId(2)), Some(vec![early, onward]));
    assert_eq!(outcome.elapsed(StationId(2)), Some(9));
    // early, late, early + onward
    assert_eq!(outcome.routes_explored, 3);
}

#[test]
fn later_arrival_changing_tours_is_pruned() {
    let mut f = Fixture::new(&["A", "B", "C", "D"]);
    let early = f.edge(0, 1, "1", 0, "10:00", "10:01");
    f.edge(0, 1, "2", 0, "10:00", "10:02");
    let onward = f.edge(1, 2, "3", 0, "10:10", "10:12");
    let network = f.build();

    let outcome = search(&network, StationId(0), Destinations::All, t("10:00"), 5, 1440);
    assert_eq!(outcome.edges(StationId(2)), Some(vec![early, onward]));
    // the 10:02 arrival at B is popped but never extended
    assert_eq!(outcome.routes_explored, 3);

    // with free transfers nothing changes: B is still settled by the 10:01 arrival
    let outcome = search(&network, StationId(0), Destinations::All, t("10:00"), 0, 1440);
    assert_eq!(outcome.edges(StationId(2)), Some(vec![early, onward]));
    assert_eq!(outcome.routes_explored, 3);
}

#[test]
fn cancellation_is_checked_on_every_step() {
    let network = general_network();
    // every station is reachable, so the last step settles the last station
    let request = SearchRequest::new(StationId(2), Destinations::All, t("02:00"), 0, 1440);

    let steps = RouteSearch::new(&network, &CancelToken::never())
        .run(&request)
        .unwrap()
        .routes_explored;
    assert!(steps > 1);

    // one poll per step: a token that fires on the last step stops the search
    let cancel = CancelToken::cancelled_after(steps - 1);
    let result = RouteSearch::new(&network, &cancel).run(&request);
    assert_eq!(result.unwrap_err(), SearchError::Cancelled);

    let cancel = CancelToken::cancelled_after(steps);
    let outcome = RouteSearch::new(&network, &cancel).run(&request).unwrap();
    assert_eq!(outcome.routes_explored, steps);
}

#[test]
fn cancellation_is_not_checked_when_nothing_is_pending() {
    let network = general_network();
    let cancel = CancelToken::new();
    cancel.cancel();

    let source = StationId(1);
    let request = SearchRequest::new(source, Destinations::single(source), t("02:00"), 0, 1440);
    let outcome = RouteSearch::new(&network, &cancel).run(&request).unwrap();
    assert_eq!(outcome.elapsed(source), Some(0));
}

#[test]
fn invalid_requests_rejected() {
    let network = general_network();
    let cancel = CancelToken::never();
    let engine = RouteSearch::new(&network, &cancel);
    let request = |source, destinations, min_transfer, max_duration| {
        SearchRequest::new(source, destinations, t("02:00"), min_transfer, max_duration)
    };

    assert_eq!(
        engine
            .run(&request(StationId(9), Destinations::All, 0, 10))
            .unwrap_err(),
        SearchError::UnknownStation(StationId(9))
    );
    assert_eq!(
        engine
            .run(&request(StationId(0), Destinations::single(StationId(5)), 0, 10))
            .unwrap_err(),
        SearchError::UnknownStation(StationId(5))
    );
    assert!(matches!(
        engine.run(&request(StationId(0), Destinations::All, -1, 10)),
        Err(SearchError::InvalidRequest(_))
    ));
    assert!(matches!(
        engine.run(&request(StationId(0), Destinations::All, 0, -1)),
        Err(SearchError::InvalidRequest(_))
    ));
}

#[test]
fn request_from_config() {
    let config = SearchConfig::new(3, 90, t("07:00"), 2);
    let request = SearchRequest::with_config(
        StationId(1),
        Destinations::from_iter([StationId(2), StationId(3)]),
        t("08:00"),
        &config,
    );
    assert_eq!(request.min_transfer_mins, 3);
    assert_eq!(request.max_duration_mins, 90);
    assert_eq!(
        request.destinations,
        Destinations::Only([StationId(2), StationId(3)].into_iter().collect())
    );
}

#[test]
fn queue_pops_shortest_then_oldest() {
    let edge = |tour| {
        Edge::new(
            StationId(0),
            StationId(1),
            LineId(0),
            TourId(tour),
            t("10:00"),
            t("10:10"),
        )
    };
    let mut queue = RouteQueue::default();
    queue.push(Route::first(t("09:00"), edge(0), 2));
    queue.push(Route::first(t("10:00"), edge(1), 2));
    queue.push(Route::first(t("10:00"), edge(2), 2));

    let order: Vec<u32> = std::iter::from_fn(|| queue.pop())
        .map(|route| route.last().tour().0)
        .collect();
    assert_eq!(order, vec![1, 2, 0]);
}

#[test]
fn clamp_minutes_saturates() {
    assert_eq!(clamp_minutes(-5), 0);
    assert_eq!(clamp_minutes(90), 90);
    assert_eq!(clamp_minutes(i64::MAX), u32::MAX);
}

// ========== properties ==========

const STATIONS: u32 = 5;

/// (from, to offset, line, tour, departure minute, travel minutes)
type EdgeParams = (u32, u32, u32, u32, i64, i64);

fn edge_params() -> impl Strategy<Value = EdgeParams> {
    (
        0..STATIONS,
        1..STATIONS,
        0u32..2,
        0u32..3,
        // mostly within two hours so connections line up, occasionally anywhere
        prop_oneof![3 => 0i64..120, 1 => 0i64..1440],
        0i64..30,
    )
}

fn network_from(edges: &[EdgeParams]) -> TransitNetwork {
    let mut builder = NetworkBuilder::new();
    for idx in 0..STATIONS {
        builder.add_station(format!("S{idx}"), 0.0, 0.0).unwrap();
    }
    for &(from, offset, line, tour, dep, travel) in edges {
        let to = (from + offset) % STATIONS;
        let line = builder.line(&line.to_string()).unwrap();
        let dep = ClockTime::from_minutes(dep);
        builder
            .add_edge(
                StationId(from),
                line,
                TourId(tour),
                StationId(to),
                dep,
                dep.later(travel),
            )
            .unwrap();
    }
    builder.build()
}

/// Least elapsed minutes to every station over all loop-free routes that
/// respect transfer times and the duration limit.
fn brute_force(
    network: &TransitNetwork,
    source: StationId,
    start: ClockTime,
    min_transfer: u32,
    max_duration: u32,
) -> BTreeMap<StationId, u32> {
    fn walk(
        network: &TransitNetwork,
        path: &mut Vec<Edge>,
        elapsed: u32,
        min_transfer: u32,
        max_duration: u32,
        best: &mut BTreeMap<StationId, u32>,
    ) {
        let Some(last) = path.last().copied() else {
            return;
        };
        let entry = best.entry(last.to()).or_insert(u32::MAX);
        *entry = (*entry).min(elapsed);

        for next in network.edges_from(last.to()) {
            let wait = last.arrival().minutes_to(next.departure());
            let total = elapsed + wait + next.travel_minutes();
            let revisits = path[0].from() == next.to() || path.iter().any(|e| e.to() == next.to());
            if total > max_duration || revisits {
                continue;
            }
            if !last.same_tour(next) && wait < min_transfer {
                continue;
            }
            path.push(*next);
            walk(network, path, total, min_transfer, max_duration, best);
            path.pop();
        }
    }

    let mut best = BTreeMap::from([(source, 0)]);
    for edge in network.edges_from(source) {
        let elapsed = start.minutes_to(edge.departure()) + edge.travel_minutes();
        if elapsed <= max_duration {
            let mut path = vec![*edge];
            walk(network, &mut path, elapsed, min_transfer, max_duration, &mut best);
        }
    }
    best
}

proptest! {
    /// Routes start at the source, chain station to station and never loop
    #[test]
    fn routes_are_connected_and_loop_free(
        edges in prop::collection::vec(edge_params(), 0..14),
        source in 0..STATIONS,
        start in 0i64..120,
        min_transfer in 0i64..6,
    ) {
        let network = network_from(&edges);
        let source = StationId(source);
        let outcome = search(&network, source, Destinations::All, ClockTime::from_minutes(start), min_transfer, 1440);

        for (station, route) in &outcome.routes {
            let Some(route) = route else {
                prop_assert_eq!(*station, source);
                continue;
            };
            let edges = route.to_edges();
            prop_assert_eq!(edges[0].from(), source);
            prop_assert_eq!(edges[edges.len() - 1].to(), *station);
            let mut seen = vec![source];
            for pair in edges.windows(2) {
                prop_assert_eq!(pair[0].to(), pair[1].from());
            }
            for edge in &edges {
                prop_assert!(!seen.contains(&edge.to()), "loop in {:?}", edges);
                seen.push(edge.to());
            }
        }
    }

    /// Every change between tours leaves at least the minimum transfer time
    #[test]
    fn changes_respect_transfer_time(
        edges in prop::collection::vec(edge_params(), 0..14),
        source in 0..STATIONS,
        start in 0i64..120,
        min_transfer in 0i64..6,
    ) {
        let network = network_from(&edges);
        let outcome = search(&network, StationId(source), Destinations::All, ClockTime::from_minutes(start), min_transfer, 1440);

        for edges in outcome.routes.values().flatten().map(|r| r.to_edges()) {
            for pair in edges.windows(2) {
                let wait = pair[0].arrival().minutes_to(pair[1].departure());
                prop_assert!(
                    pair[0].same_tour(&pair[1]) || i64::from(wait) >= min_transfer,
                    "{:?} waits {} min", pair, wait
                );
            }
        }
    }

    /// Reported elapsed minutes match the route, and no valid route beats it
    /// when changes are free
    #[test]
    fn optimal_without_transfer_time(
        edges in prop::collection::vec(edge_params(), 0..14),
        source in 0..STATIONS,
        start in 0i64..120,
        max_duration in prop_oneof![Just(1440i64), 0i64..200],
    ) {
        let network = network_from(&edges);
        let source = StationId(source);
        let start = ClockTime::from_minutes(start);
        let outcome = search(&network, source, Destinations::All, start, 0, max_duration);
        let expected = brute_force(&network, source, start, 0, max_duration as u32);

        let found: BTreeMap<StationId, u32> = outcome
            .routes
            .keys()
            .map(|id| (*id, outcome.elapsed(*id).unwrap()))
            .collect();
        prop_assert_eq!(found, expected);
    }

    /// With transfer times the search may miss routes, but never reports one
    /// shorter than exists
    #[test]
    fn never_better_than_exhaustive(
        edges in prop::collection::vec(edge_params(), 0..14),
        source in 0..STATIONS,
        start in 0i64..120,
        min_transfer in 1i64..6,
    ) {
        let network = network_from(&edges);
        let source = StationId(source);
        let start = ClockTime::from_minutes(start);
        let outcome = search(&network, source, Destinations::All, start, min_transfer, 1440);
        let exhaustive = brute_force(&network, source, start, min_transfer as u32, 1440);

        for id in outcome.routes.keys() {
            let elapsed = outcome.elapsed(*id).unwrap();
            prop_assert!(elapsed <= 1440);
            prop_assert!(exhaustive.get(id).is_some_and(|best| *best <= elapsed));
        }
    }

    /// Raising the duration limit never loses or worsens a route
    #[test]
    fn monotonic_in_duration_limit(
        edges in prop::collection::vec(edge_params(), 0..14),
        source in 0..STATIONS,
        start in 0i64..120,
        lower in 0i64..120,
        extra in 0i64..300,
    ) {
        let network = network_from(&edges);
        let source = StationId(source);
        let start = ClockTime::from_minutes(start);
        let tight = search(&network, source, Destinations::All, start, 0, lower);
        let loose = search(&network, source, Destinations::All, start, 0, lower + extra);

        for id in tight.routes.keys() {
            prop_assert!(loose.elapsed(*id) <= tight.elapsed(*id));
            prop_assert!(loose.is_reachable(*id));
        }
    }

    /// Identical inputs give identical routes
    #[test]
    fn deterministic(
        edges in prop::collection::vec(edge_params(), 0..14),
        source in 0..STATIONS,
        start in 0i64..120,
        min_transfer in 0i64..6,
    ) {
        let network = network_from(&edges);
        let start = ClockTime::from_minutes(start);
        let first = search(&network, StationId(source), Destinations::All, start, min_transfer, 1440);
        let second = search(&network, StationId(source), Destinations::All, start, min_transfer, 1440);

        for id in first.routes.keys() {
            prop_assert_eq!(first.edges(*id), second.edges(*id));
        }
        prop_assert_eq!(first.routes_explored, second.routes_explored);
    }
}
