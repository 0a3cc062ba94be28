pub use shared::{
    ApiError, CANDIDATE_COUNT, BoundingBox, CandidateRoute, Coordinate, GeoJsonListing, GeocodeResponse,
    GeocodedLocation, PlaceAddress, Priority, RouteBundle, RouteEstimate, RouteRequest,
    RouteResponse, RouteSummary,
};
